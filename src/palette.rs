//! The function palette: canned prompts grouped into tabs.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionTab {
    #[default]
    Chat,
    Analysis,
    Tools,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionItem {
    pub icon: &'static str,
    pub title: &'static str,
    pub desc: &'static str,
    pub prompt: &'static str,
}

const CHAT_FUNCTIONS: &[FunctionItem] = &[
    FunctionItem {
        icon: "📊",
        title: "Factor generation",
        desc: "Generate quant factors",
        prompt: "Please generate a momentum factor for me",
    },
    FunctionItem {
        icon: "📈",
        title: "Strategy backtest",
        desc: "Backtest on historical data",
        prompt: "Please backtest a MACD strategy",
    },
    FunctionItem {
        icon: "🔍",
        title: "Technical analysis",
        desc: "MACD, RSI, Bollinger bands",
        prompt: "/analyze 000001 technical analysis",
    },
    FunctionItem {
        icon: "⚠️",
        title: "Risk management",
        desc: "VaR, Sharpe ratio",
        prompt: "Calculate the VaR and Sharpe ratio of my portfolio",
    },
];

const ANALYSIS_FUNCTIONS: &[FunctionItem] = &[
    FunctionItem {
        icon: "📊",
        title: "Stock analysis",
        desc: "Single-stock technicals",
        prompt: "/analyze 600519 technical analysis",
    },
    FunctionItem {
        icon: "📈",
        title: "Sector analysis",
        desc: "Industry sector rotation",
        prompt: "Summarize today's sector rotation and the leading stocks",
    },
    FunctionItem {
        icon: "🔍",
        title: "Factor analysis",
        desc: "Multi-factor attribution",
        prompt: "Compare value, momentum and quality factors over the last year",
    },
    FunctionItem {
        icon: "💹",
        title: "Market overview",
        desc: "Whole-market summary",
        prompt: "Give me an overview of today's A-share market",
    },
];

const TOOL_FUNCTIONS: &[FunctionItem] = &[
    FunctionItem {
        icon: "🛠️",
        title: "Plotting",
        desc: "Data visualization",
        prompt: "/chart 30-day price trend",
    },
    FunctionItem {
        icon: "📉",
        title: "Indicators",
        desc: "Technical indicator math",
        prompt: "Show me how to compute RSI and MACD from daily closes",
    },
    FunctionItem {
        icon: "⚙️",
        title: "Parameter tuning",
        desc: "Strategy optimization",
        prompt: "Optimize the windows of a dual moving-average crossover strategy",
    },
    FunctionItem {
        icon: "📝",
        title: "Report",
        desc: "Analysis report writing",
        prompt: "Write a short market analysis report for today",
    },
];

impl FunctionTab {
    pub fn all() -> [FunctionTab; 3] {
        [FunctionTab::Chat, FunctionTab::Analysis, FunctionTab::Tools]
    }

    pub fn title(&self) -> &'static str {
        match self {
            FunctionTab::Chat => "Chat",
            FunctionTab::Analysis => "Analysis",
            FunctionTab::Tools => "Tools",
        }
    }

    pub fn items(&self) -> &'static [FunctionItem] {
        match self {
            FunctionTab::Chat => CHAT_FUNCTIONS,
            FunctionTab::Analysis => ANALYSIS_FUNCTIONS,
            FunctionTab::Tools => TOOL_FUNCTIONS,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            FunctionTab::Chat => 0,
            FunctionTab::Analysis => 1,
            FunctionTab::Tools => 2,
        }
    }

    pub fn next(&self) -> Self {
        Self::all()[(self.index() + 1) % 3]
    }

    pub fn prev(&self) -> Self {
        Self::all()[(self.index() + 2) % 3]
    }
}

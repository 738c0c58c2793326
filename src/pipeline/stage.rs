#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    IdentifyStakeholders,
    ElicitationTechniques,
    JustifyElicitation,
    GenerateUserStories,
    InvestValidation,
    Prioritize,
    EpicConflictAnalysis,
}

/// Where a stage's template input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageInput {
    ProblemStatement,
    Output(Stage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Locked,
    Available,
    Complete,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "locked"),
            Self::Available => write!(f, "available"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

impl Stage {
    /// Declared dependency order. Prioritize and EPIC conflict analysis both
    /// hang off INVEST validation and may run in either order.
    pub const ALL: [Stage; 7] = [
        Stage::IdentifyStakeholders,
        Stage::ElicitationTechniques,
        Stage::JustifyElicitation,
        Stage::GenerateUserStories,
        Stage::InvestValidation,
        Stage::Prioritize,
        Stage::EpicConflictAnalysis,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdentifyStakeholders => "identify_stakeholders",
            Self::ElicitationTechniques => "elicitation_techniques",
            Self::JustifyElicitation => "justify_elicitation",
            Self::GenerateUserStories => "generate_user_stories",
            Self::InvestValidation => "invest_validation",
            Self::Prioritize => "prioritize",
            Self::EpicConflictAnalysis => "epic_conflict_analysis",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::IdentifyStakeholders => "Stakeholders & End Users",
            Self::ElicitationTechniques => "Elicitation Techniques",
            Self::JustifyElicitation => "Justification for Techniques",
            Self::GenerateUserStories => "User Stories",
            Self::InvestValidation => "INVEST Validation Results",
            Self::Prioritize => "MoSCoW Prioritization",
            Self::EpicConflictAnalysis => "EPIC Conflicts & Resolutions",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "stage must be one of: {}",
                    Self::ALL
                        .iter()
                        .map(|stage| stage.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }

    pub fn prerequisite(self) -> Option<Stage> {
        match self {
            Self::IdentifyStakeholders => None,
            Self::ElicitationTechniques | Self::GenerateUserStories => {
                Some(Self::IdentifyStakeholders)
            }
            Self::JustifyElicitation => Some(Self::ElicitationTechniques),
            Self::InvestValidation => Some(Self::GenerateUserStories),
            Self::Prioritize | Self::EpicConflictAnalysis => Some(Self::InvestValidation),
        }
    }

    pub fn input(self) -> StageInput {
        match self.prerequisite() {
            None => StageInput::ProblemStatement,
            Some(stage) => StageInput::Output(stage),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::EpicConflictAnalysis
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

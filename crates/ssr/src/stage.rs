use std::fmt;

/// States of the render state machine, in the order a successful render
/// visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ResolvingRoute,
    FetchingData,
    PreloadingSubcomponents,
    Rendering,
    ExtractingStyles,
    AssemblingDocument,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ResolvingRoute => "resolving_route",
            Stage::FetchingData => "fetching_data",
            Stage::PreloadingSubcomponents => "preloading_subcomponents",
            Stage::Rendering => "rendering",
            Stage::ExtractingStyles => "extracting_styles",
            Stage::AssemblingDocument => "assembling_document",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod settings;

pub use settings::{
    Command, Config, OutputMode, Settings, SimpleSettings, SourceKind, SourceSettings,
    TraySettings, UiSettings,
};

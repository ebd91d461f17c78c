// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::ViewerConfig;
use crate::error::ViewerError;

#[derive(Parser, Debug, Clone)]
#[command(name = "gltf-viewer")]
#[command(about = "View a glTF scene, orbit it and click meshes to highlight them", long_about = None)]
pub struct Cli {
    /// glTF or GLB file to open
    #[arg(default_value = "models/scene.gltf")]
    pub scene: PathBuf,

    /// JSON configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Disable the status overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Initial window width in logical pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in logical pixels
    #[arg(long)]
    pub height: Option<u32>,
}

impl Cli {
    /// The configuration file (or defaults) with command-line flags applied
    pub fn resolve_config(&self) -> Result<ViewerConfig, ViewerError> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };

        if self.no_ui {
            config.show_ui = false;
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        Ok(config)
    }
}

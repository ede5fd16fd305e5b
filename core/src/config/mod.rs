pub mod load;
pub mod types;

pub use load::{get_data_dir, load_default, load_from_path};
pub use types::{
    AppConfig, ArtifactsConfig, LoggingConfig, MetadataStoreConfig, RuntimeConfig,
    SchedulerConfig,
};

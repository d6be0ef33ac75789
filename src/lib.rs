pub mod autoshuffle;
pub mod config;
pub mod events;
pub mod pool;
pub mod sampler;
pub mod tasks {
    pub mod files;
    pub mod input;
    pub mod manager;
    pub mod presenter;
}

pub mod bootstrap;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod gallery;
pub mod registry;
pub mod surface;
pub mod tasks {
    pub mod gallery;
}

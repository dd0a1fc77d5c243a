pub mod actions;
pub mod config;
pub mod error;
pub mod ids;
pub mod logger;
pub mod reconciler;
pub mod status;
pub mod store;
pub mod tabs;
pub mod util;
pub mod validator;

pub mod models {
    pub mod group;
    pub mod tab;
    pub mod update_response;
}

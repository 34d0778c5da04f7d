//! Login and registration screens.

mod render;
mod state;
mod update;

pub use render::{render_login, render_register};
pub use state::{LoginField, LoginForm, RegisterField, RegisterForm};
pub use update::{
    GOOGLE_NOT_CONFIGURED, handle_login_key, handle_register_key, start_google, submit_login,
    submit_register,
};

// SPDX-License-Identifier: MPL-2.0

mod session;
pub mod settings;

pub use session::{AuthBackend, SessionContext};
pub use settings::{AppSettings, SettingsError};

//! Opportunity application pipeline.
//!
//! Callers run [`ApplicationService::can_apply`] first and, when it allows,
//! [`ApplicationService::submit`]. Both return result objects instead of
//! errors; the typed forms are [`ApplicationService::check`] and
//! [`ApplicationService::create`].

pub mod eligibility;
pub mod notify;
pub mod profile;
pub mod service;
pub mod submitter;
pub mod transitions;
pub mod view;

pub use eligibility::EligibilityResult;
pub use notify::{Notifier, NotifyError, TracingNotifier};
pub use profile::{ProfileField, ProfilePolicy};
pub use service::{Actor, ApplicationService};
pub use submitter::SubmitResult;
pub use view::ApplyView;

pub mod admin;
pub mod card;
pub mod invitee;
pub mod listing;
pub mod pledge;
pub mod report;
pub mod security;
pub mod setting;
pub mod validate;

pub use admin::{Admin, AdminView, NewAdmin};
pub use card::{CardForm, InvitationCard};
pub use invitee::{Invitee, PaymentError, RegistrationType};
pub use pledge::{PaymentStatus, PledgeForm, PledgeUpdate, PledgeView, Progress, Tier};
pub use validate::FieldErrors;

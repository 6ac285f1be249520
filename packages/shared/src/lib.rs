//! CivicAI shared view-state contracts.
//!
//! These records are the only data exchanged between the assistant layer
//! (`civicai-assistant`) and whatever renders the portal screens. They carry
//! no behaviour beyond construction helpers and closed-set validation.
//!
//! # Modules
//!
//! - [`profile`]: the citizen identity vault record
//! - [`grievance`]: grievances, service requests and their AI classification
//! - [`welfare`]: schemes and tracked welfare benefits
//! - [`forms`]: shapes produced by the form and service use cases
//! - [`message`]: conversation history units
//! - [`error`]: closed-enumeration parse errors
//!
//! Every enumerated field (status, priority, role) is a closed set. Values are
//! parsed case-insensitively and anything outside the set is rejected:
//!
//! ```
//! use civicai_shared::Priority;
//!
//! assert_eq!("high".parse::<Priority>().ok(), Some(Priority::High));
//! assert!(Priority::try_from("Urgent".to_string()).is_err());
//! ```

pub mod error;
pub mod forms;
pub mod grievance;
pub mod message;
pub mod profile;
pub mod welfare;

pub use error::ParseEnumError;
pub use forms::{FormAnalysis, GenericFormDraft, RejectionPrediction, ServiceDetailInfo};
pub use grievance::{
    ClassificationResult, Grievance, GrievanceStatus, Priority, RequestStatus, ServiceRequest,
};
pub use message::{Message, Role};
pub use profile::UserProfile;
pub use welfare::{BenefitStatus, Scheme, WelfareBenefit};

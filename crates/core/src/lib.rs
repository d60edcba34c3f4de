pub mod audience;
pub mod config;
pub mod domain;
pub mod errors;
pub mod validation;

pub use audience::{
    build_predicate, AudienceFilter, AudiencePredicate, Constraint, FilterParams, RangeConstraint,
    RangeField, Scalar,
};
pub use domain::campaign::{Campaign, CampaignDraft, CampaignId, NewCampaign, SortOrder};
pub use domain::customer::{Customer, CustomerId, Gender, NewCustomer};
pub use domain::owner::OwnerId;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use validation::{CampaignInput, CustomerInput, FieldError, ValidationErrors};

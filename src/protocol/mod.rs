//! Request/response shapes exchanged with the REST layer.

pub mod responses;

pub use responses::{
    DeleteLicenseResponse, GetBasicStatusResponse, GetLicenseResponse, LicenseView,
    PostStartBasicResponse, PutLicenseResponse, STATUS_FORBIDDEN, STATUS_OK,
};

mod service;
mod types;

pub use service::{BOATS_ENDPOINT, BoatService};
pub use types::{
    Boat, BoatRequest, BoatType, CreateBoatRequest, Page, Pageable, SortDirection,
    UpdateBoatRequest,
};

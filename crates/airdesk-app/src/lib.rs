// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod filters;
pub mod forms;
pub mod ids;
pub mod model;
pub mod references;
pub mod resource;
pub mod schema;
pub mod state;

pub use controller::*;
pub use filters::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use references::*;
pub use resource::*;
pub use schema::*;
pub use state::*;

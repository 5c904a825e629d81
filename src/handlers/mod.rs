// One module per resource; the router in app.rs wires paths and gates.
pub mod companies;
pub mod extract;
pub mod health;
pub mod jobs;
pub mod login;
pub mod users;

use rocket::Route;

// Every route generates a `uri!` helper; outside tests only `results` is used.
#[cfg_attr(not(test), allow(unused_imports))]
mod polls;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(polls::routes());
    routes
}

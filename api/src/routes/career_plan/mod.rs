pub mod career_plan_request;
pub mod career_plan_route;

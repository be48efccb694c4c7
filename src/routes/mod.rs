pub mod appeals;
pub mod auth;
pub mod final_grades;
pub mod groups;
pub mod leaderboard;
pub mod points;
pub mod system;
pub mod tasks;
pub mod users;

pub use appeals::configure_appeal_routes;
pub use auth::configure_auth_routes;
pub use final_grades::configure_final_grade_routes;
pub use groups::configure_group_routes;
pub use leaderboard::configure_leaderboard_routes;
pub use points::configure_point_routes;
pub use system::configure_system_routes;
pub use tasks::configure_task_routes;
pub use users::configure_user_routes;

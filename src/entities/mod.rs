pub mod center;
pub mod job;
pub mod job_detail;
pub mod repository;
pub mod schedule;
pub mod server;
pub mod server_partition;
pub mod user;

pub use center::Entity as Center;
pub use job::Entity as Job;
pub use job_detail::Entity as JobDetail;
pub use repository::Entity as Repository;
pub use schedule::Entity as Schedule;
pub use server::Entity as Server;
pub use server_partition::Entity as ServerPartition;
pub use user::Entity as User;

pub mod index;
pub mod models;
pub mod repository;
pub mod store;
pub mod supabase;

pub use index::ScheduleIndex;
pub use models::{
    FieldError, FieldErrors, NewSchedule, Schedule, ScheduleField, ScheduleId, ScheduleInput,
    ScheduleTime, ScheduleUpdate,
};
pub use repository::{InMemoryScheduleRepository, ScheduleRepository};
pub use store::ScheduleStore;
pub use supabase::SupabaseScheduleRepository;

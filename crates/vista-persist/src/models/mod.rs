mod thread_state;

pub use thread_state::ThreadState;

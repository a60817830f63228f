/// Port onto the owning event loop
pub trait SessionControl {
    /// Ask the event loop to stop after the current handler returns
    fn request_exit(&mut self);

    /// Has an exit been requested?
    fn exit_requested(&self) -> bool;
}

use segring::RingParameters;

#[derive(Debug, Clone)]
pub enum AppEvent {
    StateChanged,
    /// The config file now yields these ring parameters.
    ConfigReload(RingParameters),
}

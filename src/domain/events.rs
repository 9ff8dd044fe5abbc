/// Channel lifecycle as observed by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectivityStatus {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Disconnected => "CHANNEL_DISCONNECTED",
            Self::Connecting => "CHANNEL_CONNECTING",
            Self::Connected => "CHANNEL_CONNECTED",
        }
    }

    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

//! Shared device context.

use std::sync::Arc;

use crate::config::DeviceConfig;
use crate::driver::RelayDriver;
use crate::flags::RegistrationFlags;
use crate::link::NetworkLink;

/// Everything a request handler or registration attempt needs in order to
/// observe and drive the device.
///
/// Cloning is cheap: the capability handles are shared. Mutation happens
/// only through the capabilities themselves and the registration flags, so
/// no locking is needed around the context.
#[derive(Clone)]
pub struct DeviceContext {
    pub device: DeviceConfig,
    pub relay: Arc<dyn RelayDriver>,
    pub link: Arc<dyn NetworkLink>,
    pub flags: Arc<RegistrationFlags>,
}

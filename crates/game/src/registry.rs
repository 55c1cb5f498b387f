use std::collections::BTreeMap;

use rand::{seq::IteratorRandom, Rng};
use shared::domain::{AssignedControl, ControlId, ControlSpec, DeviceId};

use crate::pool::ControlPool;

/// One connected panel. `C` is the outbound connection handle, opaque to the registry.
#[derive(Debug)]
pub struct Device<C> {
    pub id: DeviceId,
    pub controls: Vec<AssignedControl>,
    specs: Vec<ControlSpec>,
    connection: C,
}

impl<C> Device<C> {
    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn control(&self, control_id: &ControlId) -> Option<&AssignedControl> {
        self.controls.iter().find(|control| control.id == *control_id)
    }

    pub fn control_mut(&mut self, control_id: &ControlId) -> Option<&mut AssignedControl> {
        self.controls
            .iter_mut()
            .find(|control| control.id == *control_id)
    }
}

/// Connected devices and the control specs leased to each of them.
#[derive(Debug)]
pub struct SessionRegistry<C> {
    pool: ControlPool,
    devices: BTreeMap<DeviceId, Device<C>>,
    registered: u64,
    controls_per_device: usize,
}

impl<C> SessionRegistry<C> {
    pub fn new(pool: ControlPool, controls_per_device: usize) -> Self {
        Self {
            pool,
            devices: BTreeMap::new(),
            registered: 0,
            controls_per_device,
        }
    }

    pub fn pool(&self) -> &ControlPool {
        &self.pool
    }

    /// Assigns the next `device_<n>` id (ids are never reused) and leases a fresh control set.
    pub fn register<R: Rng + ?Sized>(&mut self, connection: C, rng: &mut R) -> &Device<C> {
        self.registered += 1;
        let id = DeviceId(self.registered);

        let specs = self.pool.allocate(self.controls_per_device, rng);
        let controls = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| AssignedControl::from_spec(ControlId::for_device(id, index), spec))
            .collect();

        self.devices.entry(id).or_insert(Device {
            id,
            controls,
            specs,
            connection,
        })
    }

    /// Drops the device and returns its specs to the pool. Unknown ids are a no-op.
    pub fn unregister(&mut self, id: DeviceId) -> Option<Device<C>> {
        let mut device = self.devices.remove(&id)?;
        self.pool.release(std::mem::take(&mut device.specs));
        Some(device)
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device<C>> {
        self.devices.get(&id)
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device<C>> {
        self.devices.get_mut(&id)
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.contains_key(&id)
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Device<C>> {
        self.devices.values().choose(rng)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device<C>> {
        self.devices.values()
    }

    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn registered_total(&self) -> u64 {
        self.registered
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;

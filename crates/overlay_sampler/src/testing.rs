//! Provedor falso para testes.

use crate::provider::{HardwareDevice, HardwareProvider, ProviderError, Sensor};
use overlay_core::types::{DeviceClass, MetricClass};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
enum UpdateBehavior {
    Ok,
    Fail,
    Panic,
}

pub(crate) struct FakeDevice {
    class: DeviceClass,
    name: String,
    sensors: Vec<Sensor>,
    behavior: UpdateBehavior,
    updates: Rc<Cell<usize>>,
}

impl FakeDevice {
    pub(crate) fn new(class: DeviceClass) -> Self {
        Self {
            class,
            name: format!("Fake {class}"),
            sensors: Vec::new(),
            behavior: UpdateBehavior::Ok,
            updates: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn sensor(mut self, metric: MetricClass, name: &str, value: f32) -> Self {
        self.sensors.push(Sensor::new(metric, name, Some(value)));
        self
    }

    pub(crate) fn empty_sensor(mut self, metric: MetricClass, name: &str) -> Self {
        self.sensors.push(Sensor::new(metric, name, None));
        self
    }

    pub(crate) fn failing_update(mut self) -> Self {
        self.behavior = UpdateBehavior::Fail;
        self
    }

    pub(crate) fn panicking_update(mut self) -> Self {
        self.behavior = UpdateBehavior::Panic;
        self
    }

    pub(crate) fn update_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.updates)
    }
}

impl HardwareDevice for FakeDevice {
    fn class(&self) -> DeviceClass {
        self.class
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ProviderError> {
        self.updates.set(self.updates.get() + 1);
        match self.behavior {
            UpdateBehavior::Ok => Ok(()),
            UpdateBehavior::Fail => Err(ProviderError::Refresh {
                device: self.name.clone(),
                detail: "driver não respondeu".into(),
            }),
            UpdateBehavior::Panic => panic!("driver corrompido"),
        }
    }

    fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
}

#[derive(Default)]
pub(crate) struct FakeProvider {
    devices: Vec<Box<dyn HardwareDevice>>,
    fail_open: bool,
    opened_with: Rc<RefCell<Vec<DeviceClass>>>,
}

impl FakeProvider {
    pub(crate) fn with_devices(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices: devices
                .into_iter()
                .map(|d| Box::new(d) as Box<dyn HardwareDevice>)
                .collect(),
            ..Default::default()
        }
    }

    pub(crate) fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Default::default()
        }
    }

    pub(crate) fn opened_with(&self) -> Rc<RefCell<Vec<DeviceClass>>> {
        Rc::clone(&self.opened_with)
    }
}

impl HardwareProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn open(&mut self, classes: &[DeviceClass]) -> Result<(), ProviderError> {
        if self.fail_open {
            return Err(ProviderError::Unavailable {
                provider: "fake",
                detail: "sem acesso ao driver".into(),
            });
        }
        *self.opened_with.borrow_mut() = classes.to_vec();
        Ok(())
    }

    fn devices_mut(&mut self) -> &mut [Box<dyn HardwareDevice>] {
        &mut self.devices
    }
}

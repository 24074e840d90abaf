//! Component Constitutive Models
//!
//! One pure function per component kind mapping (properties, input voltage,
//! input current) to (output voltage, output current, power, status).
//! Dispatch is a tagged enum: adding a component kind is a compile-checked
//! change, not a string-table edit. Unknown kinds resolve to no model and
//! produce no state.

use serde::{Deserialize, Serialize};

use crate::core::SolveOptions;
use crate::modules::{pin_id_from_name, ModuleKind, PinRole, PinSpec, ANALOG_PIN_OFFSET};
use crate::snapshot::{ComponentProperties, PinStates};

/// Solver-visible status of a component after a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Active,
    On,
    Off,
    Unpowered,
}

/// Input context for one constitutive evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ModelInput<'a> {
    pub properties: &'a ComponentProperties,
    /// The pin the branch entered this component through, when resolvable.
    pub pin: Option<&'a PinSpec>,
    pub pin_states: &'a PinStates,
    pub input_voltage: f64,
    pub input_current: f64,
    pub options: &'a SolveOptions,
}

/// Result of one constitutive evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub output_voltage: f64,
    pub output_current: f64,
    pub power: f64,
    pub status: ComponentStatus,
    pub is_powered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_drop: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
}

impl ModelOutput {
    fn pass_through(voltage: f64, current: f64) -> Self {
        Self {
            output_voltage: voltage,
            output_current: current,
            power: 0.0,
            status: if voltage > 0.0 {
                ComponentStatus::Active
            } else {
                ComponentStatus::Unpowered
            },
            is_powered: voltage > 0.0,
            voltage_drop: None,
            forward_voltage: None,
            is_on: None,
        }
    }

    fn blocked() -> Self {
        Self {
            output_voltage: 0.0,
            output_current: 0.0,
            power: 0.0,
            status: ComponentStatus::Off,
            is_powered: false,
            voltage_drop: None,
            forward_voltage: None,
            is_on: None,
        }
    }
}

/// Constitutive model for one component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentModel {
    Battery,
    PowerSupply,
    Resistor,
    Led,
    Motor,
    MicrocontrollerPin,
}

impl ComponentModel {
    /// Resolve the model for a component kind. Unknown kinds have no model
    /// and silently produce no state. Deliberate permissiveness.
    pub fn for_kind(kind: ModuleKind) -> Option<Self> {
        match kind {
            ModuleKind::Battery => Some(ComponentModel::Battery),
            ModuleKind::PowerSupply => Some(ComponentModel::PowerSupply),
            ModuleKind::Resistor => Some(ComponentModel::Resistor),
            ModuleKind::Led => Some(ComponentModel::Led),
            ModuleKind::Motor => Some(ComponentModel::Motor),
            ModuleKind::Microcontroller => Some(ComponentModel::MicrocontrollerPin),
            ModuleKind::Unknown => None,
        }
    }

    /// Evaluate the model. Pure: no shared state, no I/O.
    pub fn calculate(&self, input: &ModelInput<'_>) -> ModelOutput {
        match self {
            ComponentModel::Battery | ComponentModel::PowerSupply => calculate_source(input),
            ComponentModel::Resistor => calculate_resistor(input),
            ComponentModel::Led => calculate_led(input),
            ComponentModel::Motor => calculate_motor(input),
            ComponentModel::MicrocontrollerPin => calculate_microcontroller_pin(input),
        }
    }
}

/// Ideal source: outputs its configured nominal voltage regardless of input.
fn calculate_source(input: &ModelInput<'_>) -> ModelOutput {
    let nominal = input
        .properties
        .voltage
        .or(input.pin.map(|p| p.voltage))
        .unwrap_or(0.0);

    ModelOutput {
        output_voltage: nominal,
        output_current: input.input_current,
        power: nominal * input.input_current,
        status: ComponentStatus::Active,
        is_powered: nominal > 0.0,
        voltage_drop: None,
        forward_voltage: None,
        is_on: None,
    }
}

fn calculate_resistor(input: &ModelInput<'_>) -> ModelOutput {
    let resistance = input.properties.resistance.unwrap_or(0.0);
    let voltage_drop = input.input_current * resistance;
    let output_voltage = (input.input_voltage - voltage_drop).max(0.0);

    ModelOutput {
        output_voltage,
        output_current: input.input_current,
        power: voltage_drop * input.input_current,
        status: if input.input_voltage > 0.0 {
            ComponentStatus::Active
        } else {
            ComponentStatus::Unpowered
        },
        is_powered: input.input_voltage > 0.0,
        voltage_drop: Some(voltage_drop),
        forward_voltage: None,
        is_on: None,
    }
}

fn calculate_led(input: &ModelInput<'_>) -> ModelOutput {
    let forward_voltage = input
        .properties
        .forward_voltage
        .unwrap_or(input.options.default_led_forward_voltage);
    let is_on = input.input_voltage >= forward_voltage && input.input_current > 0.0;
    let output_voltage = (input.input_voltage - forward_voltage).max(0.0);

    ModelOutput {
        output_voltage,
        output_current: input.input_current,
        // Power dissipated at the junction, not the resistive-drop formula.
        power: forward_voltage * input.input_current,
        status: if is_on {
            ComponentStatus::On
        } else {
            ComponentStatus::Off
        },
        is_powered: input.input_voltage > 0.0,
        voltage_drop: None,
        forward_voltage: Some(forward_voltage),
        is_on: Some(is_on),
    }
}

fn calculate_motor(input: &ModelInput<'_>) -> ModelOutput {
    let nominal = input.properties.voltage.unwrap_or(0.0);
    let is_on = nominal > 0.0 && input.input_voltage >= nominal && input.input_current > 0.0;
    let output_voltage = (input.input_voltage - nominal).max(0.0);

    ModelOutput {
        output_voltage,
        output_current: input.input_current,
        power: nominal * input.input_current,
        status: if is_on {
            ComponentStatus::On
        } else {
            ComponentStatus::Off
        },
        is_powered: input.input_voltage > 0.0,
        voltage_drop: Some(nominal),
        forward_voltage: None,
        is_on: Some(is_on),
    }
}

/// A microcontroller pin is NOT a pass-through: GPIO/analog pins conduct
/// only while their externally supplied logic state is HIGH. Supply pins on
/// the same package pass voltage through unconditionally.
fn calculate_microcontroller_pin(input: &ModelInput<'_>) -> ModelOutput {
    let pin = match input.pin {
        Some(pin) => pin,
        // Occupied cell without pin data: treat as non-conductive.
        None => return ModelOutput::blocked(),
    };

    if !pin.role.is_logic_gated() {
        return ModelOutput::pass_through(input.input_voltage, input.input_current);
    }

    let pin_id = match pin_id_from_name(&pin.name) {
        Some(id) if pin.role == PinRole::Analog && id < ANALOG_PIN_OFFSET => {
            id + ANALOG_PIN_OFFSET
        }
        Some(id) => id,
        // Unparseable pin name behaves as absent from the state map.
        None => return ModelOutput::blocked(),
    };

    if input.pin_states.is_high(pin_id) {
        ModelOutput {
            output_voltage: input.input_voltage,
            output_current: input.input_current,
            power: 0.0,
            status: ComponentStatus::Active,
            is_powered: true,
            voltage_drop: None,
            forward_voltage: None,
            is_on: Some(true),
        }
    } else {
        ModelOutput {
            is_on: Some(false),
            ..ModelOutput::blocked()
        }
    }
}

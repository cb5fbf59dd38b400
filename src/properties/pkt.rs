//! Packet handler and power amplifier properties
//!
//! The standard configuration uses two packet fields: field 1 carries the
//! one byte length and field 2 the payload. In variable length mode the
//! length of field 2 caps the payload size on receive and sets it on
//! transmit.

use super::{Property, PropertyGroup};

/// Field 2 length, high bits
pub const PKT_FIELD_2_LENGTH_12_8: Property = Property::new(PropertyGroup::Pkt, 0x11);

/// Field 2 length, low byte (address: 0x1212)
pub const PKT_FIELD_2_LENGTH_7_0: Property = Property::new(PropertyGroup::Pkt, 0x12);

/// PA output level (address: 0x2201)
///
/// 0 is about -32 dBm, 7 about 0 dBm, 22 about 10 dBm and 127 about 20 dBm.
/// The curve is not linear.
pub const PA_PWR_LVL: Property = Property::new(PropertyGroup::Pa, 0x01);

/// Largest PA output level
pub const PA_PWR_LVL_MAX: u8 = 127;

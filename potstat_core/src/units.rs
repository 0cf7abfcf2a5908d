//! Extensive → intensive unit conversion.
//!
//! Every conversion divides a raw instrument quantity by one physical property
//! of the electrode. A property of `0.0` means "not supplied": the result is
//! then `0.0`, never an error and never NaN/Inf. Capacity, energy and current
//! results are magnitudes; the direction lives in separate charge/discharge
//! columns, not in the sign.

/// mAh per As, divided by 1000 to go from mg to g (or µL to mL).
const AS_PER_MAH_PER_KILO: f64 = 3.6e-3;

/// The property an intensive quantity is normalized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// [mg]
    Mass,
    /// [cm²]
    Area,
    /// [µL]
    Volume,
}

/// Named intensive quantities and their fixed scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// As / mg → mAh/g
    SpecificCapacity,
    /// VAs / mg → Wh/kg
    SpecificEnergy,
    /// As / µL → mAh/cm³
    VolumetricCapacity,
    /// VAs / µL → Wh/L
    VolumetricEnergy,
    /// A / mg → mA/g
    SpecificCurrent,
    /// A / cm² → mA/cm²
    AreaCurrent,
}

impl Quantity {
    pub fn property(self) -> PropertyKind {
        match self {
            Quantity::SpecificCapacity | Quantity::SpecificEnergy | Quantity::SpecificCurrent => {
                PropertyKind::Mass
            }
            Quantity::VolumetricCapacity | Quantity::VolumetricEnergy => PropertyKind::Volume,
            Quantity::AreaCurrent => PropertyKind::Area,
        }
    }

    /// Multiplier applied to `extensive / property`.
    pub fn scale(self) -> f64 {
        match self {
            Quantity::SpecificCapacity
            | Quantity::SpecificEnergy
            | Quantity::VolumetricCapacity
            | Quantity::VolumetricEnergy => 1.0 / AS_PER_MAH_PER_KILO,
            // A → mA, mg → g
            Quantity::SpecificCurrent => 1e6,
            // A → mA
            Quantity::AreaCurrent => 1e3,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Quantity::SpecificCapacity => "mAh/g",
            Quantity::SpecificEnergy => "Wh/kg",
            Quantity::VolumetricCapacity => "mAh/cm³",
            Quantity::VolumetricEnergy => "Wh/L",
            Quantity::SpecificCurrent => "mA/g",
            Quantity::AreaCurrent => "mA/cm²",
        }
    }
}

/// Map NaN/±Inf to 0.
#[inline]
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

/// `numerator / denominator`, or 0 when the denominator is 0 or the result
/// is not finite.
#[inline]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

/// Convert one extensive value.
#[inline]
pub fn normalize(extensive: f64, property: f64, quantity: Quantity) -> f64 {
    if property == 0.0 {
        return 0.0;
    }
    finite_or_zero(extensive.abs() * quantity.scale() / property)
}

/// Convert a whole series; an unset property yields a zero series of the same length.
pub fn normalize_series(extensive: &[f64], property: f64, quantity: Quantity) -> Vec<f64> {
    if property == 0.0 {
        return vec![0.0; extensive.len()];
    }
    extensive
        .iter()
        .map(|&x| normalize(x, property, quantity))
        .collect()
}

/// Hours needed to (dis)charge the theoretical capacity at `avg_current`.
///
/// `mass` in mg, `theoretical` in mAh/g, `avg_current` in A. Any zero factor
/// gives 0.
#[inline]
pub fn c_rate(mass: f64, theoretical: f64, avg_current: f64) -> f64 {
    if mass == 0.0 || theoretical == 0.0 || avg_current == 0.0 {
        return 0.0;
    }
    // mg * mAh/g = µAh; µAh / A = 1e-6 h
    finite_or_zero(mass * theoretical * 1e-6 / avg_current.abs())
}

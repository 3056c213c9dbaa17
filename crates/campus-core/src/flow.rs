//! Flow classification for energy assets.

use crate::asset::FlowType;

/// Resolve an asset's flow role.
///
/// An explicit annotation always wins. Otherwise the sign decides: negative
/// readings consume, positive ones produce, and a zero reading counts as an
/// idle consumer.
pub fn classify(signed_val: f64, explicit: Option<FlowType>) -> FlowType {
  match explicit {
    Some(flow_type) => flow_type,
    None if signed_val > 0.0 => FlowType::Producer,
    None => FlowType::Consumer,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sign_inference() {
    assert_eq!(classify(12.0, None), FlowType::Producer);
    assert_eq!(classify(-3.0, None), FlowType::Consumer);
    assert_eq!(classify(0.0, None), FlowType::Consumer);
  }

  #[test]
  fn explicit_annotation_passes_through() {
    assert_eq!(classify(-50.0, Some(FlowType::Storage)), FlowType::Storage);
    assert_eq!(classify(50.0, Some(FlowType::Consumer)), FlowType::Consumer);
    assert_eq!(classify(0.0, Some(FlowType::Sensor)), FlowType::Sensor);
  }
}

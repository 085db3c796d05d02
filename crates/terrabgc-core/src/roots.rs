//! Rooting depth and the root-length distribution over soil layers.

use crate::epv::EcophysVariables;
use crate::layers;
use crate::params::{EcophysConstants, SoilProfile};

/// Update rooting depth, the number of rooted layers and each layer's
/// share of root length.
///
/// Woody plants root to their maximum depth; herbaceous rooting depth
/// grows with fine-root carbon. Shares follow an exponential profile and
/// always sum to one over the rooted layers.
pub fn update_root_profile(
    frootc: f64,
    epc: &EcophysConstants,
    soil: &SoilProfile,
    epv: &mut EcophysVariables,
) {
    let depth = if epc.is_woody() {
        epc.max_rootdepth
    } else {
        let grown = frootc.max(0.0) / (frootc.max(0.0) + epc.froot_half_depth_c);
        epc.min_rootdepth + (epc.max_rootdepth - epc.min_rootdepth) * grown
    };
    let depth = depth.min(soil.total_depth());
    epv.rooting_depth = depth;

    layers::clear(&mut epv.rootlength_prop);
    let k = epc.root_distribution;
    let mut n_root = 0;
    for (prop, layer) in epv.rootlength_prop.iter_mut().zip(&soil.layers) {
        if layer.depth_top >= depth {
            break;
        }
        let bottom = layer.depth_bottom.min(depth);
        *prop = if k > 0.0 {
            (-k * layer.depth_top).exp() - (-k * bottom).exp()
        } else {
            bottom - layer.depth_top
        };
        n_root += 1;
    }
    epv.n_rootlayers = n_root;

    let total = layers::sum(&epv.rootlength_prop);
    if total > 0.0 {
        epv.rootlength_prop.iter_mut().for_each(|p| *p /= total);
    }
}

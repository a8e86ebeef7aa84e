//! Entity templates for bulk construction.
//!
//! A [`Prefab`] is a statically typed tuple of component values. The world
//! instantiates it in one pass: entries are collected with their component
//! ids and a type-erased emplace shim, sorted by ascending id, and written
//! straight into the new entity's signature and dense index list. This
//! avoids the quadratic index-list shifting that repeated single adds
//! would do.
//!
//! Duplicate component types inside one prefab are a programmer error and
//! asserted at instantiation time.

use std::any::Any;

use crate::engine::component::component_id_of;
use crate::engine::types::{ComponentId, DenseIndex};
use crate::engine::world::World;

/// A statically typed entity template.
///
/// Build one with [`prefab`] and hand it to
/// [`World::instantiate`](crate::engine::world::World::instantiate).
#[derive(Clone)]
pub struct Prefab<B: PrefabBundle> {
    /// The component values, one per distinct component type.
    pub components: B,
}

/// Creates a [`Prefab`] from a tuple of component values.
pub fn prefab<B: PrefabBundle>(components: B) -> Prefab<B> {
    Prefab { components }
}

/// One type-erased prefab component: its id, a borrowed value, and the
/// shim that clones the value into the right pool.
pub struct PrefabEntry<'a> {
    pub(crate) cid: ComponentId,
    pub(crate) value: &'a dyn Any,
    pub(crate) emplace: fn(&mut World, u32, u32, &dyn Any) -> DenseIndex,
}

/// Tuple of component values usable as a prefab. Implemented for tuples of
/// up to eight distinct component types.
pub trait PrefabBundle {
    /// Number of components in the bundle.
    const COUNT: usize;

    /// Collects one [`PrefabEntry`] per component, in tuple order.
    fn collect<'a>(&'a self, out: &mut Vec<PrefabEntry<'a>>);
}

fn emplace_cloned<T: 'static + Clone>(
    world: &mut World,
    slot: u32,
    gen: u32,
    value: &dyn Any,
) -> DenseIndex {
    let value = value.downcast_ref::<T>().expect("prefab entry type mismatch").clone();
    world.pool_mut::<T>().emplace(slot, gen, value)
}

impl PrefabBundle for () {
    const COUNT: usize = 0;

    fn collect<'a>(&'a self, _out: &mut Vec<PrefabEntry<'a>>) {}
}

macro_rules! impl_prefab_bundle {
    ($count:expr, $($t:ident . $idx:tt),+) => {
        impl<$($t: 'static + Clone),+> PrefabBundle for ($($t,)+) {
            const COUNT: usize = $count;

            fn collect<'a>(&'a self, out: &mut Vec<PrefabEntry<'a>>) {
                $(
                    out.push(PrefabEntry {
                        cid: component_id_of::<$t>(),
                        value: &self.$idx,
                        emplace: emplace_cloned::<$t>,
                    });
                )+
            }
        }
    };
}

impl_prefab_bundle!(1, A.0);
impl_prefab_bundle!(2, A.0, B.1);
impl_prefab_bundle!(3, A.0, B.1, C.2);
impl_prefab_bundle!(4, A.0, B.1, C.2, D.3);
impl_prefab_bundle!(5, A.0, B.1, C.2, D.3, E.4);
impl_prefab_bundle!(6, A.0, B.1, C.2, D.3, E.4, F.5);
impl_prefab_bundle!(7, A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_prefab_bundle!(8, A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);

use std::ops::{Index, IndexMut};

/// Plant tissues carrying carbon and nitrogen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tissue {
    Leaf,
    Froot,
    Fruit,
    Softstem,
    Livestem,
    Deadstem,
    Livecroot,
    Deadcroot,
}

impl Tissue {
    pub const COUNT: usize = 8;

    pub const ALL: [Tissue; Tissue::COUNT] = [
        Tissue::Leaf,
        Tissue::Froot,
        Tissue::Fruit,
        Tissue::Softstem,
        Tissue::Livestem,
        Tissue::Deadstem,
        Tissue::Livecroot,
        Tissue::Deadcroot,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Tissue::Leaf => "leaf",
            Tissue::Froot => "froot",
            Tissue::Fruit => "fruit",
            Tissue::Softstem => "softstem",
            Tissue::Livestem => "livestem",
            Tissue::Deadstem => "deadstem",
            Tissue::Livecroot => "livecroot",
            Tissue::Deadcroot => "deadcroot",
        }
    }

    pub fn is_wood(self) -> bool {
        matches!(
            self,
            Tissue::Livestem | Tissue::Deadstem | Tissue::Livecroot | Tissue::Deadcroot
        )
    }

    pub fn is_live_wood(self) -> bool {
        matches!(self, Tissue::Livestem | Tissue::Livecroot)
    }

    /// Tissues carrying maintenance respiration.
    pub fn respires(self) -> bool {
        !matches!(self, Tissue::Deadstem | Tissue::Deadcroot)
    }

    /// Whether litter from this tissue enters below the surface layer.
    pub fn is_belowground(self) -> bool {
        matches!(self, Tissue::Froot | Tissue::Livecroot | Tissue::Deadcroot)
    }

    /// Leaf, fruit and soft stem: the pools subject to senescence,
    /// mowing and grazing.
    pub fn is_green_aboveground(self) -> bool {
        matches!(self, Tissue::Leaf | Tissue::Fruit | Tissue::Softstem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPool {
    Active,
    Storage,
    Transfer,
}

impl SubPool {
    pub const ALL: [SubPool; 3] = [SubPool::Active, SubPool::Storage, SubPool::Transfer];

    pub fn name(self) -> &'static str {
        match self {
            SubPool::Active => "",
            SubPool::Storage => "_storage",
            SubPool::Transfer => "_transfer",
        }
    }
}

/// Displayed tissue plus its storage and transfer reserves.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TissuePools {
    pub active: f64,
    pub storage: f64,
    pub transfer: f64,
}

impl TissuePools {
    pub fn total(&self) -> f64 {
        self.active + self.storage + self.transfer
    }

    /// Storage plus transfer: the non-structural reserve.
    pub fn reserve(&self) -> f64 {
        self.storage + self.transfer
    }

    pub fn get(&self, sub: SubPool) -> f64 {
        match sub {
            SubPool::Active => self.active,
            SubPool::Storage => self.storage,
            SubPool::Transfer => self.transfer,
        }
    }

    pub fn get_mut(&mut self, sub: SubPool) -> &mut f64 {
        match sub {
            SubPool::Active => &mut self.active,
            SubPool::Storage => &mut self.storage,
            SubPool::Transfer => &mut self.transfer,
        }
    }
}

/// Per-tissue pools of one element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlantPools([TissuePools; Tissue::COUNT]);

impl PlantPools {
    pub fn total(&self) -> f64 {
        self.0.iter().map(TissuePools::total).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tissue, &TissuePools)> {
        Tissue::ALL.iter().copied().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Tissue, &mut TissuePools)> {
        Tissue::ALL.iter().copied().zip(self.0.iter_mut())
    }
}

impl Index<Tissue> for PlantPools {
    type Output = TissuePools;

    fn index(&self, t: Tissue) -> &TissuePools {
        &self.0[t.index()]
    }
}

impl IndexMut<Tissue> for PlantPools {
    fn index_mut(&mut self, t: Tissue) -> &mut TissuePools {
        &mut self.0[t.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_all_order() {
        for (i, t) in Tissue::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn plant_pools_total() {
        let mut p = PlantPools::default();
        p[Tissue::Leaf].active = 0.2;
        p[Tissue::Leaf].storage = 0.1;
        p[Tissue::Deadstem].active = 3.0;
        assert!((p.total() - 3.3).abs() < 1e-12);
        assert_eq!(p[Tissue::Leaf].reserve(), 0.1);
    }

    #[test]
    fn dead_wood_does_not_respire() {
        assert!(!Tissue::Deadstem.respires());
        assert!(Tissue::Livecroot.respires());
        assert!(Tissue::Livecroot.is_live_wood());
        assert!(Tissue::Deadcroot.is_belowground());
    }
}

//! Projectile recycling
//!
//! Released projectiles go onto a free list and come back out LIFO. Shots are
//! moved in and out by value, so a released projectile cannot still be held
//! in the active list.

use serde::{Deserialize, Serialize};

use super::projectile::{Projectile, ShotRequest};

/// Allocation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Projectiles constructed because the free list was empty
    pub created: u64,
    /// Acquisitions served from the free list
    pub reused: u64,
    pub released: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectilePool {
    free: Vec<Projectile>,
    next_id: u32,
    stats: PoolStats,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently released projectile, or a fresh one
    pub fn acquire(&mut self) -> Projectile {
        match self.free.pop() {
            Some(p) => {
                self.stats.reused += 1;
                p
            }
            None => {
                self.next_id += 1;
                self.stats.created += 1;
                Projectile::new(self.next_id)
            }
        }
    }

    pub fn release(&mut self, mut projectile: Projectile) {
        debug_assert!(projectile.dead, "released a live projectile");
        projectile.dead = true;
        self.stats.released += 1;
        self.free.push(projectile);
    }

    /// Projectiles waiting on the free list
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

/// Live projectiles backed by a pool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Projectiles {
    pub active: Vec<Projectile>,
    pool: ProjectilePool,
}

impl Projectiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a projectile from the pool, initialize it, and make it live
    pub fn fire(&mut self, shot: &ShotRequest) {
        let mut p = self.pool.acquire();
        p.reset(shot);
        self.active.push(p);
    }

    /// Return every dead projectile to the pool, keeping survivor order
    pub fn reap(&mut self) -> usize {
        let mut reaped = 0;
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].dead {
                let p = self.active.remove(i);
                self.pool.release(p);
                reaped += 1;
            } else {
                i += 1;
            }
        }
        reaped
    }

    /// Release everything (wave transitions)
    pub fn clear(&mut self) {
        for mut p in self.active.drain(..) {
            p.dead = true;
            self.pool.release(p);
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.active.iter()
    }

    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }
}

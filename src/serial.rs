//! Binary dump and restore.
//!
//! Two formats, both little-endian:
//!
//! * a packed edge (8 bytes, [`Edge::raw`]), meaningful only to the manager
//!   that produced it and only while the node is alive;
//! * a self-contained truth table: the magic `TTBL`, a `u32` variable count
//!   `n`, `n` variable ids as `u32`, then `2^n` values packed LSB-first.
//!   Row `p` assigns bit `n-1-i` of `p` to the `i`-th variable.

use std::io::{Read, Write};

use log::debug;

use crate::bdd::Bdd;
use crate::edge::Edge;
use crate::error::{DumpError, Invalid, RestoreError};
use crate::mgr::BddMgr;
use crate::types::VarId;

/// Largest support a truth table may have.
pub const MAX_TRUTH_TABLE_VARS: usize = 24;

const MAGIC: [u8; 4] = *b"TTBL";

fn read_u32(reader: &mut impl Read) -> std::io::Result<u32> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

impl<'m> Bdd<'m> {
    /// Writes the packed edge.
    pub fn dump_edge(&self, mut writer: impl Write) -> Result<(), DumpError> {
        self.check()?;
        writer.write_all(&self.edge().raw().to_le_bytes())?;
        Ok(())
    }

    /// Writes the truth table over the support.
    pub fn dump_truth_table(&self, mut writer: impl Write) -> Result<(), DumpError> {
        self.check()?;
        let vars = self.support();
        if vars.len() > MAX_TRUTH_TABLE_VARS {
            return Err(DumpError::TooManyVars {
                count: vars.len(),
                max: MAX_TRUTH_TABLE_VARS,
            });
        }
        let table = self.to_truth_table(&vars).ok_or(Invalid::Error)?;

        let mut bytes = vec![0u8; table.len().div_ceil(8)];
        for (p, &value) in table.iter().enumerate() {
            if value {
                bytes[p / 8] |= 1 << (p % 8);
            }
        }

        writer.write_all(&MAGIC)?;
        writer.write_all(&(vars.len() as u32).to_le_bytes())?;
        for var in &vars {
            writer.write_all(&var.id().to_le_bytes())?;
        }
        writer.write_all(&bytes)?;
        debug!("Dumped truth table over {} variables", vars.len());
        Ok(())
    }
}

impl BddMgr {
    /// Handle for a raw edge, if it denotes a live function of this manager.
    pub fn bdd_from_edge(&self, edge: Edge) -> Result<Bdd<'_>, RestoreError> {
        if let Some(invalid) = Invalid::of(edge) {
            return Err(invalid.into());
        }
        if let Some(id) = edge.node_id() {
            if !self.core.borrow().table.is_live(id) {
                return Err(RestoreError::DanglingNode(edge.raw()));
            }
        }
        Ok(self.handle(edge))
    }

    /// Reads a packed edge written by [`Bdd::dump_edge`].
    pub fn restore_edge(&self, mut reader: impl Read) -> Result<Bdd<'_>, RestoreError> {
        let mut buf = [0; 8];
        reader.read_exact(&mut buf)?;
        let raw = u64::from_le_bytes(buf);
        let edge = Edge::from_raw(raw).ok_or(RestoreError::BadEdge(raw))?;
        self.bdd_from_edge(edge)
    }

    /// Reads a truth table written by [`Bdd::dump_truth_table`].
    pub fn restore_truth_table(&self, mut reader: impl Read) -> Result<Bdd<'_>, RestoreError> {
        let mut magic = [0; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(RestoreError::BadMagic(magic));
        }
        let count = read_u32(&mut reader)? as usize;
        if count > MAX_TRUTH_TABLE_VARS {
            return Err(RestoreError::TooManyVars {
                count,
                max: MAX_TRUTH_TABLE_VARS,
            });
        }
        let vars = (0..count)
            .map(|_| read_u32(&mut reader).map(VarId::new))
            .collect::<std::io::Result<Vec<_>>>()?;

        let rows = 1usize << count;
        let mut bytes = vec![0u8; rows.div_ceil(8)];
        reader.read_exact(&mut bytes)?;
        let table: Vec<bool> = (0..rows).map(|p| bytes[p / 8] >> (p % 8) & 1 != 0).collect();

        let f = self.tvec_to_bdd(&table, &vars);
        f.check()?;
        Ok(f)
    }
}

//! Synthetic data sets for manager tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use byteorder::{LittleEndian, WriteBytesExt};
use tempfile::TempDir;

pub const ANIMATED_FLAG: u32 = 0x0100_0000;

const LAND_GROUP_SIZE: usize = 4 + 32 * 26;
const STATIC_GROUP_SIZE: usize = 4 + 32 * 37;
const MAP_BLOCK_SIZE: usize = 196;

/// A base directory and a shard directory holding a minimal data set.
pub struct DataSet {
    root: TempDir,
}

impl DataSet {
    /// Every required file, with map plane 0 (2x2 blocks) and anim file 0
    /// present but nothing patched.
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("base")).unwrap();
        fs::create_dir(root.path().join("shard")).unwrap();

        let set = Self { root };
        set.write_base("tiledata.mul", &tiledata(&[(5, ANIMATED_FLAG), (6, 0)]));
        set.write_base("hues.mul", &[]);
        for (idx, mul) in [
            ("texidx.mul", "texmaps.mul"),
            ("artidx.mul", "art.mul"),
            ("gumpidx.mul", "gumpart.mul"),
        ] {
            set.write_store(idx, mul, &[]);
        }
        set.write_base("animdata.mul", &[]);

        set.write_base("map0.mul", &[map_block(10), map_block(11), map_block(12), map_block(13)].concat());
        set.write_store("staidx0.mul", "statics0.mul", &[(3, statics(&[(0x100, 1, 2, 3)]))]);

        // File 0: ten high-detail bodies, body 1 has five facings of action 0.
        set.write_store(
            "anim.idx",
            "anim.mul",
            &(0..5).map(|d| (110 + d, animation(d as usize + 1, 7))).collect::<Vec<_>>(),
        );

        set.write_base("mobtypes.txt", b"400 HUMAN 0\n200 ANIMAL 0\n");
        set.write_base("body.def", b"5 {9} 0\n6 {10, 11} 33\n");
        set.write_base("bodyconv.def", b"5 3\n7 -1 -1 -1 -1\n");
        set
    }

    pub fn base(&self) -> PathBuf {
        self.root.path().join("base")
    }

    pub fn shard(&self) -> PathBuf {
        self.root.path().join("shard")
    }

    pub fn write_base(&self, name: &str, bytes: &[u8]) {
        fs::write(self.base().join(name), bytes).unwrap();
    }

    pub fn write_shard(&self, name: &str, bytes: &[u8]) {
        fs::write(self.shard().join(name), bytes).unwrap();
    }

    pub fn remove_base(&self, name: &str) {
        fs::remove_file(self.base().join(name)).unwrap();
    }

    /// Write an idx/mul pair into the base directory. Ids not listed in
    /// `records` are unused slots; the index covers up to the largest id.
    pub fn write_store(&self, index: &str, data: &str, records: &[(u32, Vec<u8>)]) {
        let (idx, mul) = store(records);
        self.write_base(index, &idx);
        self.write_base(data, &mul);
    }
}

pub fn store(records: &[(u32, Vec<u8>)]) -> (Vec<u8>, Vec<u8>) {
    let slots = records.iter().map(|(id, _)| id + 1).max().unwrap_or(0);
    let mut idx = Vec::new();
    let mut mul = Vec::new();
    for id in 0..slots {
        match records.iter().find(|(rid, _)| *rid == id) {
            Some((_, bytes)) => {
                idx.write_i32::<LittleEndian>(mul.len() as i32).unwrap();
                idx.write_i32::<LittleEndian>(bytes.len() as i32).unwrap();
                mul.extend_from_slice(bytes);
            }
            None => {
                idx.write_i32::<LittleEndian>(-1).unwrap();
                idx.write_i32::<LittleEndian>(-1).unwrap();
            }
        }
        idx.write_i32::<LittleEndian>(0).unwrap();
    }
    (idx, mul)
}

/// Full land table followed by one static group with the given flags.
pub fn tiledata(statics: &[(usize, u32)]) -> Vec<u8> {
    let mut out = vec![0u8; 512 * LAND_GROUP_SIZE];
    let group_start = out.len();
    out.resize(group_start + STATIC_GROUP_SIZE, 0);
    for &(id, flags) in statics {
        let at = group_start + 4 + id * 37;
        out[at..at + 4].copy_from_slice(&flags.to_le_bytes());
    }
    out
}

/// A map block whose every cell has tile id `tile`.
pub fn map_block(tile: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAP_BLOCK_SIZE);
    out.write_u32::<LittleEndian>(0).unwrap();
    for _ in 0..64 {
        out.write_u16::<LittleEndian>(tile).unwrap();
        out.write_i8(0).unwrap();
    }
    out
}

/// Static entries `(art, x, y, z)`.
pub fn statics(items: &[(u16, u8, u8, i8)]) -> Vec<u8> {
    let mut out = Vec::new();
    for &(art, x, y, z) in items {
        out.write_u16::<LittleEndian>(art).unwrap();
        out.write_u8(x).unwrap();
        out.write_u8(y).unwrap();
        out.write_i8(z).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
    }
    out
}

/// An animation with `frames` frames, each `width` pixels wide and one
/// row high.
pub fn animation(frames: usize, width: u16) -> Vec<u8> {
    let mut out = vec![0u8; 512];

    let table = 4 + frames * 4;
    let frame_size = 8 + 4 + width as usize + 4;
    out.write_u32::<LittleEndian>(frames as u32).unwrap();
    for i in 0..frames {
        out.write_u32::<LittleEndian>((table + i * frame_size) as u32).unwrap();
    }
    for _ in 0..frames {
        out.write_i16::<LittleEndian>(0).unwrap();
        out.write_i16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(width).unwrap();
        out.write_u16::<LittleEndian>(1).unwrap();
        let header = (0x200u32 << 22) | (0x1FFu32 << 12) | width as u32;
        out.write_u32::<LittleEndian>(header).unwrap();
        out.extend(std::iter::repeat(1u8).take(width as usize));
        out.write_u32::<LittleEndian>(0x7FFF_7FFF).unwrap();
    }
    out
}

/// Block ids for a `mapdifl`/`stadifl` list.
pub fn block_list(blocks: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &block in blocks {
        out.write_u32::<LittleEndian>(block).unwrap();
    }
    out
}


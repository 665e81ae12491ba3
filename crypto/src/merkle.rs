//! SHA-256 Merkle trees with per-leaf inclusion proofs.
//!
//! Hashing follows RFC 6962: leaves are hashed as `SHA256(0x00 ‖ leaf)`,
//! inner nodes as `SHA256(0x01 ‖ left ‖ right)`, and a tree over `n > 1`
//! items splits at the largest power of two strictly below `n`. The empty
//! tree hashes to `SHA256("")`.

use crate::hash::{sha256, sha256_multi};
use crate::CryptoError;

const LEAF_PREFIX: &[u8] = &[0x00];
const INNER_PREFIX: &[u8] = &[0x01];

/// Maximum number of sibling hashes a proof may carry.
pub const MAX_AUNTS: usize = 100;

pub fn empty_hash() -> [u8; 32] {
    sha256(&[])
}

pub fn leaf_hash(leaf: &[u8]) -> [u8; 32] {
    sha256_multi(&[LEAF_PREFIX, leaf])
}

pub fn inner_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    sha256_multi(&[INNER_PREFIX, left, right])
}

/// Largest power of two strictly less than `n` (`n >= 2`).
fn split_point(n: usize) -> usize {
    debug_assert!(n >= 2);
    1usize << (usize::BITS - 1 - (n - 1).leading_zeros())
}

/// Compute the root over already-hashed leaves, collecting each leaf's
/// sibling path (bottom-up) into `aunts`.
fn build(leaf_hashes: &[[u8; 32]], aunts: &mut [Vec<[u8; 32]>]) -> [u8; 32] {
    match leaf_hashes.len() {
        0 => empty_hash(),
        1 => leaf_hashes[0],
        n => {
            let k = split_point(n);
            let (left_aunts, right_aunts) = aunts.split_at_mut(k);
            let left = build(&leaf_hashes[..k], left_aunts);
            let right = build(&leaf_hashes[k..], right_aunts);
            for path in left_aunts.iter_mut() {
                path.push(right);
            }
            for path in right_aunts.iter_mut() {
                path.push(left);
            }
            inner_hash(&left, &right)
        }
    }
}

/// Compute the root of a tree over `items`, in order.
pub fn root_from_leaves<T: AsRef<[u8]>>(items: &[T]) -> [u8; 32] {
    let hashes: Vec<[u8; 32]> = items.iter().map(|i| leaf_hash(i.as_ref())).collect();
    let mut scratch = vec![Vec::new(); hashes.len()];
    build(&hashes, &mut scratch)
}

fn root_from_aunts(
    index: u64,
    total: u64,
    leaf_hash: [u8; 32],
    aunts: &[[u8; 32]],
) -> Option<[u8; 32]> {
    if index >= total {
        return None;
    }
    match total {
        0 => None,
        1 => aunts.is_empty().then_some(leaf_hash),
        _ => {
            let (top, rest) = aunts.split_last()?;
            let num_left = split_point(usize::try_from(total).ok()?) as u64;
            if index < num_left {
                let left = root_from_aunts(index, num_left, leaf_hash, rest)?;
                Some(inner_hash(&left, top))
            } else {
                let right = root_from_aunts(index - num_left, total - num_left, leaf_hash, rest)?;
                Some(inner_hash(top, &right))
            }
        }
    }
}

/// Proof that one leaf sits at `index` in a tree of `total` leaves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionProof {
    pub total: u64,
    pub index: u64,
    pub leaf_hash: [u8; 32],
    /// Sibling hashes from the leaf up to the root.
    pub aunts: Vec<[u8; 32]>,
}

impl InclusionProof {
    /// Structural checks that do not need the root.
    pub fn validate_basic(&self) -> Result<(), CryptoError> {
        if self.total == 0 {
            return Err(CryptoError::InvalidProof("empty tree has no proofs".into()));
        }
        if self.index >= self.total {
            return Err(CryptoError::InvalidProof(format!(
                "index {} out of range for total {}",
                self.index, self.total
            )));
        }
        if self.aunts.len() > MAX_AUNTS {
            return Err(CryptoError::InvalidProof(format!(
                "{} sibling hashes exceed the maximum of {MAX_AUNTS}",
                self.aunts.len()
            )));
        }
        Ok(())
    }

    /// Recompute the root this proof commits to.
    pub fn compute_root(&self) -> Result<[u8; 32], CryptoError> {
        self.validate_basic()?;
        root_from_aunts(self.index, self.total, self.leaf_hash, &self.aunts)
            .ok_or_else(|| CryptoError::InvalidProof("sibling path does not fit the tree".into()))
    }

    /// Verify that `leaf` is committed under `root` at this proof's index.
    pub fn verify(&self, root: &[u8; 32], leaf: &[u8]) -> Result<(), CryptoError> {
        if leaf_hash(leaf) != self.leaf_hash {
            return Err(CryptoError::InvalidProof("leaf hash mismatch".into()));
        }
        if self.compute_root()? != *root {
            return Err(CryptoError::InvalidProof("root mismatch".into()));
        }
        Ok(())
    }
}

/// A Merkle tree over an ordered list of leaves, keeping every proof.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    root: [u8; 32],
    proofs: Vec<InclusionProof>,
}

impl MerkleTree {
    pub fn from_leaves<T: AsRef<[u8]>>(items: &[T]) -> Self {
        let hashes: Vec<[u8; 32]> = items.iter().map(|i| leaf_hash(i.as_ref())).collect();
        let mut aunts = vec![Vec::new(); hashes.len()];
        let root = build(&hashes, &mut aunts);
        let total = hashes.len() as u64;
        let proofs = hashes
            .into_iter()
            .zip(aunts)
            .enumerate()
            .map(|(i, (leaf_hash, aunts))| InclusionProof {
                total,
                index: i as u64,
                leaf_hash,
                aunts,
            })
            .collect();
        Self { root, proofs }
    }

    pub fn root(&self) -> [u8; 32] {
        self.root
    }

    pub fn proofs(&self) -> &[InclusionProof] {
        &self.proofs
    }

    pub fn into_parts(self) -> ([u8; 32], Vec<InclusionProof>) {
        (self.root, self.proofs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<[u8; 32]> {
        (0..n).map(|i| [i as u8; 32]).collect()
    }

    #[test]
    fn split_points() {
        assert_eq!(split_point(2), 1);
        assert_eq!(split_point(3), 2);
        assert_eq!(split_point(4), 2);
        assert_eq!(split_point(5), 4);
        assert_eq!(split_point(8), 4);
        assert_eq!(split_point(9), 8);
        assert_eq!(split_point(100), 64);
    }

    #[test]
    fn empty_tree_root() {
        let items: Vec<[u8; 32]> = Vec::new();
        assert_eq!(root_from_leaves(&items), empty_hash());
        assert!(MerkleTree::from_leaves(&items).proofs().is_empty());
    }

    #[test]
    fn single_leaf_root_is_leaf_hash() {
        let items = leaves(1);
        let tree = MerkleTree::from_leaves(&items);
        assert_eq!(tree.root(), leaf_hash(&items[0]));
        assert!(tree.proofs()[0].aunts.is_empty());
    }

    #[test]
    fn two_leaf_root() {
        let items = leaves(2);
        let expected = inner_hash(&leaf_hash(&items[0]), &leaf_hash(&items[1]));
        assert_eq!(root_from_leaves(&items), expected);
    }

    #[test]
    fn three_leaf_shape_is_left_heavy() {
        let items = leaves(3);
        let left = inner_hash(&leaf_hash(&items[0]), &leaf_hash(&items[1]));
        let expected = inner_hash(&left, &leaf_hash(&items[2]));
        assert_eq!(root_from_leaves(&items), expected);
    }

    #[test]
    fn every_proof_verifies() {
        for n in [1usize, 2, 3, 5, 7, 8, 13, 100] {
            let items = leaves(n);
            let tree = MerkleTree::from_leaves(&items);
            assert_eq!(tree.root(), root_from_leaves(&items));
            for (i, proof) in tree.proofs().iter().enumerate() {
                assert_eq!(proof.index, i as u64);
                assert_eq!(proof.total, n as u64);
                proof.verify(&tree.root(), &items[i]).unwrap();
            }
        }
    }

    #[test]
    fn proof_for_wrong_leaf_fails() {
        let items = leaves(8);
        let tree = MerkleTree::from_leaves(&items);
        assert!(tree.proofs()[3].verify(&tree.root(), &items[4]).is_err());
    }

    #[test]
    fn proof_against_other_root_fails() {
        let tree_a = MerkleTree::from_leaves(&leaves(8));
        let mut other = leaves(8);
        other[7] = [0xEE; 32];
        let tree_b = MerkleTree::from_leaves(&other);
        assert!(tree_a.proofs()[0].verify(&tree_b.root(), &leaves(8)[0]).is_err());
    }

    #[test]
    fn proof_with_moved_index_fails() {
        let items = leaves(8);
        let tree = MerkleTree::from_leaves(&items);
        let mut proof = tree.proofs()[2].clone();
        proof.index = 3;
        assert!(proof.verify(&tree.root(), &items[2]).is_err());
    }

    #[test]
    fn proof_with_extra_aunt_fails() {
        let items = leaves(4);
        let tree = MerkleTree::from_leaves(&items);
        let mut proof = tree.proofs()[0].clone();
        proof.aunts.push([0u8; 32]);
        assert!(proof.verify(&tree.root(), &items[0]).is_err());
    }

    #[test]
    fn validate_basic_rejects_out_of_range_index() {
        let proof = InclusionProof {
            total: 2,
            index: 2,
            leaf_hash: [0u8; 32],
            aunts: vec![[0u8; 32]],
        };
        assert!(proof.validate_basic().is_err());
    }

    #[test]
    fn validate_basic_rejects_too_many_aunts() {
        let proof = InclusionProof {
            total: 4,
            index: 0,
            leaf_hash: [0u8; 32],
            aunts: vec![[0u8; 32]; MAX_AUNTS + 1],
        };
        assert!(proof.validate_basic().is_err());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents the ScriptPublicKey Version
pub type ScriptPublicKeyVersion = u16;

/// Locking script of an output. The consensus engine treats the script as
/// opaque bytes; only its version and content are committed to.
#[derive(Default, PartialEq, Eq, Clone, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScriptPublicKey {
    pub version: ScriptPublicKeyVersion,
    script: Vec<u8>, // Kept private to preserve read-only semantics
}

impl ScriptPublicKey {
    pub fn new(version: ScriptPublicKeyVersion, script: Vec<u8>) -> Self {
        Self { version, script }
    }

    pub fn version(&self) -> ScriptPublicKeyVersion {
        self.version
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }
}

impl fmt::Debug for ScriptPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptPublicKey").field("version", &self.version).field("script", &hex::encode(&self.script)).finish()
    }
}

impl fmt::Display for ScriptPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.script))
    }
}

/// Parses a version 0 script from its hex form
impl FromStr for ScriptPublicKey {
    type Err = hex::FromHexError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(0, hex::decode(hex_str)?))
    }
}

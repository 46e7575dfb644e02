//! Config-driven contract bindings over a temporary directory

use std::fs;
use std::path::Path;

use abikit::config::Config;
use abikit::CallCodec;
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{address, U256};

const TOKEN_ABI: &str = r#"[
    {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
    {"type":"event","name":"Transfer","inputs":[{"name":"from","type":"address","indexed":true},{"name":"to","type":"address","indexed":true},{"name":"value","type":"uint256","indexed":false}],"anonymous":false},
    {"type":"error","name":"InsufficientBalance","inputs":[{"name":"available","type":"uint256"},{"name":"required","type":"uint256"}]}
]"#;

const VAULT_ABI: &str = r#"[
    {"type":"function","name":"deposit","inputs":[{"name":"assets","type":"uint256"},{"name":"receiver","type":"address"}],"outputs":[{"name":"shares","type":"uint256"}],"stateMutability":"nonpayable"}
]"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    // build artifact with the ABI nested under `abi`
    write(
        root,
        "out/Token.sol/Token.json",
        &format!(r#"{{"abi":{TOKEN_ABI},"bytecode":{{"object":"0x"}}}}"#),
    );
    write(root, "abi/vault.json", VAULT_ABI);
    write(
        root,
        "abikit.toml",
        r#"
        [[contracts]]
        name = "token"
        address = "0x00000000000000000000000000000000000000AA"
        abi = "out/Token.sol/Token.json"

        [[contracts]]
        name = "vault"
        address = "0x00000000000000000000000000000000000000bb"
        abi = "abi/vault.json"
        "#,
    );
    dir
}

#[test]
fn test_config_bindings() {
    let dir = project();
    let config = Config::load_from(&dir.path().join("abikit.toml")).unwrap();
    let bindings = config.bindings().unwrap();
    assert_eq!(bindings.len(), 2);

    let (name, token) = &bindings[0];
    assert_eq!(name, "token");
    assert_eq!(token.address(), address!("00000000000000000000000000000000000000aa"));
    assert!(token.function("0xa9059cbb").is_ok());
    assert!(token.event("Transfer").is_ok());
    assert!(token.error("InsufficientBalance").is_ok());

    let (name, vault) = &bindings[1];
    assert_eq!(name, "vault");
    assert!(vault.function("deposit").is_ok());
}

#[test]
fn test_registry_decodes_calldata() {
    let dir = project();
    let config = Config::load_from(&dir.path().join("abikit.toml")).unwrap();
    let registry = config.registry().unwrap();
    assert_eq!(registry.len(), 4);

    let deposit = registry.functions().find(|f| f.name == "deposit").unwrap().clone();
    let receiver = address!("1111111111111111111111111111111111111111");
    let data = CallCodec::encode_call(
        &deposit,
        &[DynSolValue::Uint(U256::from(500u64), 256), DynSolValue::Address(receiver)],
    )
    .unwrap();

    let decoded = CallCodec::decode_calldata(&registry, &data).unwrap().unwrap();
    assert_eq!(decoded.function.canonical, "deposit(uint256,address)");
    let args = decoded.to_args();
    assert_eq!(args[0].name, "assets");
    assert_eq!(args[0].value, "500");
    assert_eq!(args[1].kind, "address");

    assert!(CallCodec::decode_calldata(&registry, &[0xde, 0xad, 0xbe, 0xef])
        .unwrap()
        .is_none());
    assert_eq!(
        CallCodec::decode_calldata(&registry, &[0xde]).unwrap_err().reason(),
        "DataTooShort"
    );
}

#[test]
fn test_missing_abi_names_contract() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "abikit.toml",
        r#"
        [[contracts]]
        name = "ghost"
        address = "0x00000000000000000000000000000000000000aa"
        abi = "missing.json"
        "#,
    );
    let config = Config::load_from(&dir.path().join("abikit.toml")).unwrap();
    let err = config.bindings().unwrap_err();
    assert!(format!("{err:#}").contains("ghost"));
    assert!(config.registry().is_err());
}

#[test]
fn test_abi_without_entries_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "meta.json", r#"{"id":"abc"}"#);
    write(
        dir.path(),
        "abikit.toml",
        r#"
        [[contracts]]
        name = "meta"
        address = "0x00000000000000000000000000000000000000aa"
        abi = "meta.json"
        "#,
    );
    let config = Config::load_from(&dir.path().join("abikit.toml")).unwrap();
    let err = config.bindings().unwrap_err();
    assert!(format!("{err:#}").contains("invalid ABI for `meta`"));
}

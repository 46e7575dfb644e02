//! Call encoding cross-checked against alloy-sol-types bindings
//!
//! Every encoding produced from a runtime ABI description must be byte-equal
//! to what the compile-time `sol!` bindings produce for the same function.

use abikit::{
    CallCodec, ContractBinding, ContractDescriptor, EncodeArguments, FromParameterOutputs,
    FunctionSignature, MessageDescription, MessageKind, Parameter, ParameterOutputs, TypeCatalog,
};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

sol! {
    struct Order {
        address maker;
        uint256[2] amounts;
        bytes data;
    }

    struct Terms {
        address who;
        bool flag;
    }

    function transfer(address to, uint256 amount) returns (bool);
    function settle(uint256 n, Terms t, Terms[] rest);
    function fill(Order order, string memo);
    function totalSupply() returns (uint256);
}

const TOKEN: Address = address!("00000000000000000000000000000000000000aa");
const ALICE: Address = address!("1111111111111111111111111111111111111111");

const ERC20_ABI: &str = r#"[
    {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
    {"type":"function","name":"getReserves","inputs":[],"outputs":[{"name":"reserve0","type":"uint112"},{"name":"reserve1","type":"uint112"},{"name":"blockTimestampLast","type":"uint32"}],"stateMutability":"view"},
    {"type":"function","name":"fill","inputs":[{"name":"order","type":"tuple","internalType":"struct Order","components":[{"name":"maker","type":"address"},{"name":"amounts","type":"uint256[2]"},{"name":"data","type":"bytes"}]},{"name":"memo","type":"string"}],"outputs":[],"stateMutability":"nonpayable"}
]"#;

struct Transfer {
    to: Address,
    amount: U256,
}

impl MessageKind for Transfer {
    fn describe() -> MessageDescription {
        MessageDescription::function("transfer")
            .input(Parameter::new("to", "address", 1))
            .input(Parameter::new("amount", "uint256", 2))
            .output(Parameter::new("", "bool", 1))
    }
}

impl EncodeArguments for Transfer {
    fn arguments(&self) -> Vec<DynSolValue> {
        vec![
            DynSolValue::Address(self.to),
            DynSolValue::Uint(self.amount, 256),
        ]
    }
}

#[derive(Debug, PartialEq)]
struct Reserves {
    reserve0: U256,
    reserve1: U256,
    timestamp: U256,
}

impl FromParameterOutputs for Reserves {
    fn from_outputs(outputs: ParameterOutputs) -> abikit::Result<Self> {
        Ok(Self {
            reserve0: outputs.uint("reserve0")?,
            reserve1: outputs.uint("reserve1")?,
            timestamp: outputs.uint("blockTimestampLast")?,
        })
    }
}

#[test]
fn test_transfer_matches_sol_binding() {
    let binding = ContractBinding::from_json(TOKEN, ERC20_ABI).unwrap();
    let function = binding.function("transfer").unwrap();
    assert_eq!(function.signature().selector, transferCall::SELECTOR);

    let ours = function
        .encode(&[
            DynSolValue::Address(ALICE),
            DynSolValue::Uint(U256::from(1_000_000u64), 256),
        ])
        .unwrap();
    let theirs = transferCall {
        to: ALICE,
        amount: U256::from(1_000_000u64),
    }
    .abi_encode();
    assert_eq!(ours.to_vec(), theirs);
}

#[test]
fn test_tuple_argument_matches_sol_binding() {
    let descriptor = ContractDescriptor::from_json(ERC20_ABI).unwrap();
    let fill = descriptor.function("fill").unwrap();
    assert_eq!(fill.canonical, "fill((address,uint256[2],bytes),string)");
    assert_eq!(fill.selector, fillCall::SELECTOR);

    let ours = CallCodec::encode_call(
        fill,
        &[
            DynSolValue::Tuple(vec![
                DynSolValue::Address(ALICE),
                DynSolValue::FixedArray(vec![
                    DynSolValue::Uint(U256::from(1u64), 256),
                    DynSolValue::Uint(U256::from(2u64), 256),
                ]),
                DynSolValue::Bytes(vec![0xca, 0xfe]),
            ]),
            DynSolValue::String("gm".into()),
        ],
    )
    .unwrap();
    let theirs = fillCall {
        order: Order {
            maker: ALICE,
            amounts: [U256::from(1u64), U256::from(2u64)],
            data: Bytes::from(vec![0xca, 0xfe]),
        },
        memo: "gm".into(),
    }
    .abi_encode();
    assert_eq!(ours.to_vec(), theirs);

    let decoded = CallCodec::decode_input(fill, &ours).unwrap();
    let order = decoded.nested("order").unwrap();
    assert_eq!(order.address("maker").unwrap(), ALICE);
    assert_eq!(order.bytes("data").unwrap(), vec![0xca, 0xfe]);
    assert_eq!(decoded.string("memo").unwrap(), "gm");
}

#[test]
fn test_declared_kind_matches_abi() {
    let catalog = TypeCatalog::new();
    let binding = ContractBinding::from_json(TOKEN, ERC20_ABI).unwrap();

    let declared = binding
        .encode_message(
            &catalog,
            &Transfer {
                to: ALICE,
                amount: U256::from(7u64),
            },
        )
        .unwrap();
    let from_abi = binding
        .function("0xa9059cbb")
        .unwrap()
        .encode(&[
            DynSolValue::Address(ALICE),
            DynSolValue::Uint(U256::from(7u64), 256),
        ])
        .unwrap();
    assert_eq!(declared, from_abi);
    assert_eq!(
        binding.function_for::<Transfer>(&catalog).unwrap().signature().canonical,
        "transfer(address,uint256)"
    );
}

#[test]
fn test_zero_argument_call() {
    let total_supply = FunctionSignature::new(
        "totalSupply",
        vec![],
        vec![Parameter::new("", "uint256", 1)],
    )
    .unwrap();
    let data = CallCodec::encode_call(&total_supply, &[]).unwrap();
    assert_eq!(data.to_vec(), totalSupplyCall {}.abi_encode());
    assert_eq!(data.len(), 4);
}

#[test]
fn test_decode_return_as() {
    let descriptor = ContractDescriptor::from_json(ERC20_ABI).unwrap();
    let get_reserves = descriptor.function("getReserves").unwrap();
    let data = DynSolValue::Tuple(vec![
        DynSolValue::Uint(U256::from(10u64), 112),
        DynSolValue::Uint(U256::from(20u64), 112),
        DynSolValue::Uint(U256::from(1_700_000_000u64), 32),
    ])
    .abi_encode_params();

    let reserves: Reserves = CallCodec::decode_return_as(get_reserves, &data).unwrap();
    assert_eq!(
        reserves,
        Reserves {
            reserve0: U256::from(10u64),
            reserve1: U256::from(20u64),
            timestamp: U256::from(1_700_000_000u64),
        }
    );

    let err = CallCodec::decode_return(get_reserves, &data[..64]).unwrap_err();
    assert_eq!(err.reason(), "DataTooShort");
}

#[test]
fn test_names_do_not_change_selector() {
    let a = FunctionSignature::new(
        "transfer",
        vec![
            Parameter::new("to", "address", 1),
            Parameter::new("amount", "uint256", 2),
        ],
        vec![],
    )
    .unwrap();
    let b = FunctionSignature::new(
        "transfer",
        vec![
            Parameter::new("recipient", "address", 1),
            Parameter::new("", "uint", 2),
        ],
        vec![],
    )
    .unwrap();
    assert_eq!(a.selector, b.selector);
    assert_eq!(a.canonical, b.canonical);
}

#[test]
fn test_custom_error_round_trip() {
    let binding = ContractBinding::from_human_readable(
        TOKEN,
        ["error InsufficientBalance(uint256 available, uint256 required)"],
    )
    .unwrap();
    let error = binding.error("InsufficientBalance").unwrap();

    let mut data = error.selector.to_vec();
    data.extend(
        DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(3u64), 256),
            DynSolValue::Uint(U256::from(9u64), 256),
        ])
        .abi_encode_params(),
    );
    let outputs = CallCodec::decode_custom_error(&data, &error).unwrap();
    assert_eq!(outputs.uint("available").unwrap(), U256::from(3u64));

    let mut other = data.clone();
    other[0] ^= 0xff;
    let err = CallCodec::decode_custom_error(&other, &error).unwrap_err();
    assert_eq!(err.reason(), "NotMatchingError");
    assert!(err.to_string().contains("InsufficientBalance(uint256,uint256)"));
}

#[test]
fn test_explicit_order_applies_at_every_level() {
    // declared as (t, rest, n) with components (flag, who); encoded as (n, t, rest)
    let terms = || {
        vec![
            Parameter::new("flag", "bool", 2),
            Parameter::new("who", "address", 1),
        ]
    };
    let settle = FunctionSignature::new(
        "settle",
        vec![
            Parameter::new("t", "tuple", 2).with_components(terms()),
            Parameter::new("rest", "tuple[]", 3).with_components(terms()),
            Parameter::new("n", "uint256", 1),
        ],
        vec![],
    )
    .unwrap();
    assert_eq!(settle.canonical, "settle(uint256,(address,bool),(address,bool)[])");
    assert_eq!(settle.selector, settleCall::SELECTOR);

    let declared = |flag: bool, who: Address| {
        DynSolValue::Tuple(vec![DynSolValue::Bool(flag), DynSolValue::Address(who)])
    };
    let ours = CallCodec::encode_call(
        &settle,
        &[
            declared(true, ALICE),
            DynSolValue::Array(vec![declared(false, TOKEN), declared(true, ALICE)]),
            DynSolValue::Uint(U256::from(5u64), 256),
        ],
    )
    .unwrap();
    let theirs = settleCall {
        n: U256::from(5u64),
        t: Terms { who: ALICE, flag: true },
        rest: vec![
            Terms { who: TOKEN, flag: false },
            Terms { who: ALICE, flag: true },
        ],
    }
    .abi_encode();
    assert_eq!(ours.to_vec(), theirs);

    let decoded = CallCodec::decode_input(&settle, &ours).unwrap();
    let t = decoded.nested("t").unwrap();
    assert_eq!(t.address("who").unwrap(), ALICE);
    assert!(t.boolean("flag").unwrap());
    let rest = decoded.nested_list("rest").unwrap();
    assert_eq!(rest[0].address("who").unwrap(), TOKEN);
    assert!(!rest[0].boolean("flag").unwrap());
}

#[test]
fn test_is_data_for_signature_across_descriptor() {
    let descriptor = ContractDescriptor::from_human_readable([
        "function transfer(address to, uint256 amount) returns (bool)",
        "function approve(address spender, uint256 amount) returns (bool)",
        "function balanceOf(address owner) view returns (uint256)",
        "function totalSupply() view returns (uint256)",
    ])
    .unwrap();
    let args = |function: &FunctionSignature| -> Vec<DynSolValue> {
        function
            .inputs
            .iter()
            .map(|param| match param.kind.as_str() {
                "address" => DynSolValue::Address(ALICE),
                _ => DynSolValue::Uint(U256::from(42u64), 256),
            })
            .collect()
    };

    for function in &descriptor.functions {
        let data = CallCodec::encode_call_hex(function, &args(function.as_ref())).unwrap();
        for other in &descriptor.functions {
            assert_eq!(
                CallCodec::is_data_for_signature(&other.selector_hex(), &data),
                other.selector == function.selector,
                "{} data checked against {}",
                function.canonical,
                other.canonical
            );
        }
        let upper = data.to_uppercase().replacen("0X", "0x", 1);
        assert!(CallCodec::is_data_for_signature(&function.selector_hex(), &upper));
    }
}

use crate::test_utils::pair_table;
use crate::{ParseTable, dump, write};

#[test]
fn dump_pair_table() {
    let table = ParseTable::from_bytes(write(&pair_table()).unwrap()).unwrap();

    insta::assert_snapshot!(dump(&table), @r#"
    [table]
    name = pair
    version = 1
    start = pair

    [symbols]
    0 end  ; terminal
    1 "a"  ; terminal
    2 _space  ; terminal hidden extra
    3 pair

    [productions]
    P0 pair / 1
    P1 pair / 2  dynamic=-1

    [states]
    S0 M1
      "a" => shift S2
      pair => goto S1
    S1 M2
      end => accept
    S2 M1
      end => reduce P0
      "a" => shift S3
    S3 M2
      end => reduce P1

    [lex.modes]
    M0 = {"a"}
    M1 = {"a"}
    M2 = {}

    [lex.states]
    L0 0x20 -> L2, 'a' -> L1
    L1  ; accept "a"
    L2 0x20 -> L2  ; accept _space
    "#);
}

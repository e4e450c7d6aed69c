use super::*;

#[test]
fn passes_result_through() {
    let result: Result<u8, &str> = ensure_sufficient_stack(|| Ok(7));
    assert_eq!(result, Ok(7));
}

#[test]
fn survives_deep_recursion() {
    fn nest(depth: u32) -> u32 {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { nest(depth - 1) + 1 })
    }

    assert_eq!(nest(200_000), 200_000);
}

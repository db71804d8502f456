/// CLI entry point for snippet encoder generation.
///
/// At the moment this only prints a placeholder message.  The real work is done
/// in [`tpde_encodegen::generate`].  See [`tpde_core::overview`] for an
/// overview of the intended workflow.
fn main() {
    println!("tpde-encodegen placeholder");
}

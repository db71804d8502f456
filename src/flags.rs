//! Configuration surface of the compiler and the page space. Defaults match
//! the values the runtime ships with; the ilview tool maps these onto CLI
//! options.

#[derive(Clone, Debug)]
pub struct Flags {
    /// Disassemble unoptimized code after compilation.
    pub disassemble: bool,

    /// Disassemble optimized code after compilation.
    pub disassemble_optimized: bool,

    /// Print the flow graph before and after optimization.
    pub print_flow_graph: bool,

    /// Trace compile starts, installs and entry patching.
    pub trace_compiler: bool,

    /// Trace optimizer bailouts.
    pub trace_bailout: bool,

    /// Enable dominator-based common subexpression elimination.
    pub cse: bool,

    /// Enable loop-invariant code motion.
    pub licm: bool,

    /// Enable inlining of trivial leaf functions.
    pub use_inlining: bool,

    /// Stop consulting type feedback after this many deopts of a function.
    pub deoptimization_counter_threshold: u32,

    /// The desired maximum percentage of free space after GC.
    pub heap_growth_space_ratio: i64,

    /// The desired maximum percentage of time spent in GC.
    pub heap_growth_time_ratio: i64,

    /// The size the heap is grown, in heap pages.
    pub heap_growth_rate: i64,

    /// Print free list statistics before a GC.
    pub print_free_list_before_gc: bool,

    /// Print free list statistics after a GC.
    pub print_free_list_after_gc: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            disassemble: false,
            disassemble_optimized: false,
            print_flow_graph: false,
            trace_compiler: false,
            trace_bailout: false,
            cse: true,
            licm: true,
            use_inlining: true,
            deoptimization_counter_threshold: 5,
            heap_growth_space_ratio: 10,
            heap_growth_time_ratio: 3,
            heap_growth_rate: 4,
            print_free_list_before_gc: false,
            print_free_list_after_gc: false,
        }
    }
}

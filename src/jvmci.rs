//! Flags read by the JVMCI compiler and the VM code that talks to it.
//!
//! Only flags the VM side needs are declared here. Options private to the
//! compiler live with the compiler.

use crate::flags::{DefaultValue, FlagDescriptor, FlagType, K};

pub const ENABLE_JVMCI: &str = "EnableJVMCI";
pub const USE_JVMCI_COMPILER: &str = "UseJVMCICompiler";
pub const JVMCI_PRINT_PROPERTIES: &str = "JVMCIPrintProperties";
pub const USE_JVMCI_CLASS_LOADER: &str = "UseJVMCIClassLoader";
pub const BOOTSTRAP_JVMCI: &str = "BootstrapJVMCI";
pub const PRINT_BOOTSTRAP: &str = "PrintBootstrap";
pub const EAGER_JVMCI: &str = "EagerJVMCI";
pub const JVMCI_THREADS: &str = "JVMCIThreads";
pub const JVMCI_HOST_THREADS: &str = "JVMCIHostThreads";
pub const CODE_INSTALL_SAFEPOINT_CHECKS: &str = "CodeInstallSafepointChecks";
pub const MAX_VECTOR_SIZE: &str = "MaxVectorSize";
pub const REDUCE_INITIAL_CARD_MARKS: &str = "ReduceInitialCardMarks";
pub const JVMCI_TRACE_LEVEL: &str = "JVMCITraceLevel";
pub const JVMCI_COUNTER_SIZE: &str = "JVMCICounterSize";
pub const JVMCI_COUNTERS_EXCLUDE_COMPILER: &str = "JVMCICountersExcludeCompiler";
pub const JVMCI_USE_FAST_LOCKING: &str = "JVMCIUseFastLocking";
pub const JVMCI_NMETHOD_SIZE_LIMIT: &str = "JVMCINMethodSizeLimit";
pub const METHOD_PROFILE_WIDTH: &str = "MethodProfileWidth";
pub const TRACE_UNCOLLECTED_SPECULATIONS: &str = "TraceUncollectedSpeculations";

pub static JVMCI_FLAGS: &[FlagDescriptor] = &[
    FlagDescriptor::product(ENABLE_JVMCI, DefaultValue::Bool(true),
        "Enable JVMCI"),
    FlagDescriptor::product(USE_JVMCI_COMPILER, DefaultValue::Bool(false),
        "Use JVMCI as the default compiler. Will be true by default \
         if jvmci.Compiler property is set (either on command line or \
         from contents of <java.home>/lib/jvmci/compiler-name"),
    FlagDescriptor::product(JVMCI_PRINT_PROPERTIES, DefaultValue::Bool(false),
        "Prints properties used by the JVMCI compiler and exits"),
    FlagDescriptor::product(USE_JVMCI_CLASS_LOADER, DefaultValue::Bool(true),
        "Load JVMCI classes with separate class loader"),
    FlagDescriptor::product(BOOTSTRAP_JVMCI, DefaultValue::Bool(false),
        "Bootstrap JVMCI before running Java main method"),
    FlagDescriptor::product(PRINT_BOOTSTRAP, DefaultValue::Bool(true),
        "Print JVMCI bootstrap progress and summary"),
    FlagDescriptor::product(EAGER_JVMCI, DefaultValue::Bool(false),
        "Force eager initialization of the JVMCI compiler"),
    FlagDescriptor::product(JVMCI_THREADS, DefaultValue::Intx(1),
        "Force number of JVMCI compiler threads to use"),
    FlagDescriptor::product(JVMCI_HOST_THREADS, DefaultValue::Intx(1),
        "Force number of compiler threads for JVMCI host compiler"),
    FlagDescriptor::product(CODE_INSTALL_SAFEPOINT_CHECKS, DefaultValue::Bool(true),
        "Perform explicit safepoint checks while installing code"),
    FlagDescriptor::product_pd(MAX_VECTOR_SIZE, FlagType::Intx,
        "Max vector size in bytes, \
         actual size could be less depending on elements type")
        .without_compiler2(),
    FlagDescriptor::product(REDUCE_INITIAL_CARD_MARKS, DefaultValue::Bool(true),
        "Defer write barriers of young objects")
        .without_compiler2(),
    FlagDescriptor::product(JVMCI_TRACE_LEVEL, DefaultValue::Intx(0),
        "Trace level for JVMCI: \
         1 means emit a message for each CompilerToVM call, \
         levels greater than 1 provide progressively greater detail"),
    FlagDescriptor::product(JVMCI_COUNTER_SIZE, DefaultValue::Intx(0),
        "Reserved size for benchmark counters"),
    FlagDescriptor::product(JVMCI_COUNTERS_EXCLUDE_COMPILER, DefaultValue::Bool(true),
        "Exclude JVMCI compiler threads from benchmark counters"),
    FlagDescriptor::develop(JVMCI_USE_FAST_LOCKING, DefaultValue::Bool(true),
        "Use fast inlined locking code"),
    FlagDescriptor::product(JVMCI_NMETHOD_SIZE_LIMIT, DefaultValue::Words(80 * K),
        "Maximum size of a compiled method."),
    FlagDescriptor::product(METHOD_PROFILE_WIDTH, DefaultValue::Intx(0),
        "Number of methods to record in call profile"),
    FlagDescriptor::develop(TRACE_UNCOLLECTED_SPECULATIONS, DefaultValue::Bool(false),
        "Print message when a failed speculation was not collected"),
];

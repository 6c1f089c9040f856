//! Opcode table: numeric codes, mnemonics and operand schemas.
//!
//! Covers the SPIR-V 1.6 core grammar. Entries marked `typed` start with
//! `IdResultType` and `IdResult`; entries marked `result` start with
//! `IdResult` alone.

use crate::spirv::operand::{OperandKind, OperandSpec, Quantifier};

macro_rules! schema {
    (typed; $($quantifier:ident $kind:ident $name:literal),*) => {
        schema!(;
            One IdResultType "ResultType",
            One IdResult "Result"
            $(, $quantifier $kind $name)*
        )
    };
    (result; $($quantifier:ident $kind:ident $name:literal),*) => {
        schema!(; One IdResult "Result" $(, $quantifier $kind $name)*)
    };
    (; $($quantifier:ident $kind:ident $name:literal),*) => {
        &[$(
            OperandSpec {
                name: $name,
                kind: OperandKind::$kind,
                quantifier: Quantifier::$quantifier,
            }
        ),*]
    };
}

macro_rules! define_ops {
    ($(
        $variant:ident = $code:literal $($shape:ident)?
            [$($quantifier:ident $kind:ident $name:literal),* $(,)?]
    ),* $(,)?) => {
        /// Known opcodes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum Op {
            $(
                #[doc = concat!("`Op", stringify!($variant), "`")]
                $variant = $code,
            )*
        }

        impl Op {
            /// Resolves a raw opcode.
            pub const fn from_u16(code: u16) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// Returns the `Op`-prefixed mnemonic.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => concat!("Op", stringify!($variant)),)*
                }
            }

            /// Returns the ordered operand schema.
            pub fn operands(self) -> &'static [OperandSpec] {
                match self {
                    $(Self::$variant => schema!($($shape)?; $($quantifier $kind $name),*),)*
                }
            }
        }
    };
}

define_ops! {
    // Miscellaneous, debug and annotation
    Nop = 0 [],
    Undef = 1 typed [],
    SourceContinued = 2 [One LiteralString "ContinuedSource"],
    Source = 3 [
        One ValueEnum "SourceLanguage",
        One LiteralInteger "Version",
        Optional IdRef "File",
        Optional LiteralString "Source",
    ],
    SourceExtension = 4 [One LiteralString "Extension"],
    Name = 5 [One IdRef "Target", One LiteralString "Name"],
    MemberName = 6 [One IdRef "Type", One LiteralInteger "Member", One LiteralString "Name"],
    String = 7 result [One LiteralString "String"],
    Line = 8 [One IdRef "File", One LiteralInteger "Line", One LiteralInteger "Column"],
    Extension = 10 [One LiteralString "Name"],
    ExtInstImport = 11 result [One LiteralString "Name"],
    ExtInst = 12 typed [
        One IdRef "Set",
        One LiteralExtInstInteger "Instruction",
        Variadic IdRef "Operands",
    ],
    MemoryModel = 14 [One ValueEnum "AddressingModel", One ValueEnum "MemoryModel"],
    EntryPoint = 15 [
        One ValueEnum "ExecutionModel",
        One IdRef "EntryPoint",
        One LiteralString "Name",
        Variadic IdRef "Interface",
    ],
    ExecutionMode = 16 [
        One IdRef "EntryPoint",
        One ValueEnum "Mode",
        Variadic LiteralInteger "Operands",
    ],
    Capability = 17 [One ValueEnum "Capability"],

    // Types
    TypeVoid = 19 result [],
    TypeBool = 20 result [],
    TypeInt = 21 result [One LiteralInteger "Width", One LiteralInteger "Signedness"],
    TypeFloat = 22 result [One LiteralInteger "Width", Optional ValueEnum "FloatingPointEncoding"],
    TypeVector = 23 result [One IdRef "ComponentType", One LiteralInteger "ComponentCount"],
    TypeMatrix = 24 result [One IdRef "ColumnType", One LiteralInteger "ColumnCount"],
    TypeImage = 25 result [
        One IdRef "SampledType",
        One ValueEnum "Dim",
        One LiteralInteger "Depth",
        One LiteralInteger "Arrayed",
        One LiteralInteger "MS",
        One LiteralInteger "Sampled",
        One ValueEnum "ImageFormat",
        Optional ValueEnum "AccessQualifier",
    ],
    TypeSampler = 26 result [],
    TypeSampledImage = 27 result [One IdRef "ImageType"],
    TypeArray = 28 result [One IdRef "ElementType", One IdRef "Length"],
    TypeRuntimeArray = 29 result [One IdRef "ElementType"],
    TypeStruct = 30 result [Variadic IdRef "MemberTypes"],
    TypeOpaque = 31 result [One LiteralString "TypeName"],
    TypePointer = 32 result [One ValueEnum "StorageClass", One IdRef "Type"],
    TypeFunction = 33 result [One IdRef "ReturnType", Variadic IdRef "ParameterTypes"],
    TypeEvent = 34 result [],
    TypeDeviceEvent = 35 result [],
    TypeReserveId = 36 result [],
    TypeQueue = 37 result [],
    TypePipe = 38 result [One ValueEnum "Qualifier"],
    TypeForwardPointer = 39 [One IdRef "PointerType", One ValueEnum "StorageClass"],

    // Constants
    ConstantTrue = 41 typed [],
    ConstantFalse = 42 typed [],
    Constant = 43 typed [One LiteralContextDependentNumber "Value"],
    ConstantComposite = 44 typed [Variadic IdRef "Constituents"],
    ConstantSampler = 45 typed [
        One ValueEnum "SamplerAddressingMode",
        One LiteralInteger "Param",
        One ValueEnum "SamplerFilterMode",
    ],
    ConstantNull = 46 typed [],
    SpecConstantTrue = 48 typed [],
    SpecConstantFalse = 49 typed [],
    SpecConstant = 50 typed [One LiteralContextDependentNumber "Value"],
    SpecConstantComposite = 51 typed [Variadic IdRef "Constituents"],
    SpecConstantOp = 52 typed [One LiteralSpecConstantOpInteger "Opcode"],

    // Functions
    Function = 54 typed [One BitEnum "FunctionControl", One IdRef "FunctionType"],
    FunctionParameter = 55 typed [],
    FunctionEnd = 56 [],
    FunctionCall = 57 typed [One IdRef "Function", Variadic IdRef "Arguments"],

    // Memory
    Variable = 59 typed [One ValueEnum "StorageClass", Optional IdRef "Initializer"],
    ImageTexelPointer = 60 typed [One IdRef "Image", One IdRef "Coordinate", One IdRef "Sample"],
    Load = 61 typed [
        One IdRef "Pointer",
        Optional BitEnum "MemoryAccess",
        Variadic LiteralInteger "MemoryAccessOperands",
    ],
    Store = 62 [
        One IdRef "Pointer",
        One IdRef "Object",
        Optional BitEnum "MemoryAccess",
        Variadic LiteralInteger "MemoryAccessOperands",
    ],
    CopyMemory = 63 [
        One IdRef "Target",
        One IdRef "Source",
        Optional BitEnum "MemoryAccess",
        Variadic LiteralInteger "MemoryAccessOperands",
    ],
    CopyMemorySized = 64 [
        One IdRef "Target",
        One IdRef "Source",
        One IdRef "Size",
        Optional BitEnum "MemoryAccess",
        Variadic LiteralInteger "MemoryAccessOperands",
    ],
    AccessChain = 65 typed [One IdRef "Base", Variadic IdRef "Indexes"],
    InBoundsAccessChain = 66 typed [One IdRef "Base", Variadic IdRef "Indexes"],
    PtrAccessChain = 67 typed [One IdRef "Base", One IdRef "Element", Variadic IdRef "Indexes"],
    ArrayLength = 68 typed [One IdRef "Structure", One LiteralInteger "ArrayMember"],
    GenericPtrMemSemantics = 69 typed [One IdRef "Pointer"],
    InBoundsPtrAccessChain = 70 typed [
        One IdRef "Base",
        One IdRef "Element",
        Variadic IdRef "Indexes",
    ],

    // Annotations
    Decorate = 71 [
        One IdRef "Target",
        One ValueEnum "Decoration",
        Variadic LiteralInteger "DecorationParameters",
    ],
    MemberDecorate = 72 [
        One IdRef "StructureType",
        One LiteralInteger "Member",
        One ValueEnum "Decoration",
        Variadic LiteralInteger "DecorationParameters",
    ],
    DecorationGroup = 73 result [],
    GroupDecorate = 74 [One IdRef "DecorationGroup", Variadic IdRef "Targets"],
    GroupMemberDecorate = 75 [
        One IdRef "DecorationGroup",
        Variadic PairIdRefLiteralInteger "Targets",
    ],

    // Composites
    VectorExtractDynamic = 77 typed [One IdRef "Vector", One IdRef "Index"],
    VectorInsertDynamic = 78 typed [One IdRef "Vector", One IdRef "Component", One IdRef "Index"],
    VectorShuffle = 79 typed [
        One IdRef "Vector1",
        One IdRef "Vector2",
        Variadic LiteralInteger "Components",
    ],
    CompositeConstruct = 80 typed [Variadic IdRef "Constituents"],
    CompositeExtract = 81 typed [One IdRef "Composite", Variadic LiteralInteger "Indexes"],
    CompositeInsert = 82 typed [
        One IdRef "Object",
        One IdRef "Composite",
        Variadic LiteralInteger "Indexes",
    ],
    CopyObject = 83 typed [One IdRef "Operand"],
    Transpose = 84 typed [One IdRef "Matrix"],

    // Images
    SampledImage = 86 typed [One IdRef "Image", One IdRef "Sampler"],
    ImageSampleImplicitLod = 87 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSampleExplicitLod = 88 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSampleDrefImplicitLod = 89 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSampleDrefExplicitLod = 90 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        One BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSampleProjImplicitLod = 91 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSampleProjExplicitLod = 92 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSampleProjDrefImplicitLod = 93 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSampleProjDrefExplicitLod = 94 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        One BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageFetch = 95 typed [
        One IdRef "Image",
        One IdRef "Coordinate",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageGather = 96 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Component",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageDrefGather = 97 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageRead = 98 typed [
        One IdRef "Image",
        One IdRef "Coordinate",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageWrite = 99 [
        One IdRef "Image",
        One IdRef "Coordinate",
        One IdRef "Texel",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    Image = 100 typed [One IdRef "SampledImage"],
    ImageQueryFormat = 101 typed [One IdRef "Image"],
    ImageQueryOrder = 102 typed [One IdRef "Image"],
    ImageQuerySizeLod = 103 typed [One IdRef "Image", One IdRef "LevelOfDetail"],
    ImageQuerySize = 104 typed [One IdRef "Image"],
    ImageQueryLod = 105 typed [One IdRef "SampledImage", One IdRef "Coordinate"],
    ImageQueryLevels = 106 typed [One IdRef "Image"],
    ImageQuerySamples = 107 typed [One IdRef "Image"],

    // Conversions
    ConvertFToU = 109 typed [One IdRef "FloatValue"],
    ConvertFToS = 110 typed [One IdRef "FloatValue"],
    ConvertSToF = 111 typed [One IdRef "SignedValue"],
    ConvertUToF = 112 typed [One IdRef "UnsignedValue"],
    UConvert = 113 typed [One IdRef "UnsignedValue"],
    SConvert = 114 typed [One IdRef "SignedValue"],
    FConvert = 115 typed [One IdRef "FloatValue"],
    QuantizeToF16 = 116 typed [One IdRef "Value"],
    ConvertPtrToU = 117 typed [One IdRef "Pointer"],
    SatConvertSToU = 118 typed [One IdRef "SignedValue"],
    SatConvertUToS = 119 typed [One IdRef "UnsignedValue"],
    ConvertUToPtr = 120 typed [One IdRef "IntegerValue"],
    PtrCastToGeneric = 121 typed [One IdRef "Pointer"],
    GenericCastToPtr = 122 typed [One IdRef "Pointer"],
    GenericCastToPtrExplicit = 123 typed [One IdRef "Pointer", One ValueEnum "Storage"],
    Bitcast = 124 typed [One IdRef "Operand"],

    // Arithmetic
    SNegate = 126 typed [One IdRef "Operand"],
    FNegate = 127 typed [One IdRef "Operand"],
    IAdd = 128 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FAdd = 129 typed [One IdRef "Operand1", One IdRef "Operand2"],
    ISub = 130 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FSub = 131 typed [One IdRef "Operand1", One IdRef "Operand2"],
    IMul = 132 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FMul = 133 typed [One IdRef "Operand1", One IdRef "Operand2"],
    UDiv = 134 typed [One IdRef "Operand1", One IdRef "Operand2"],
    SDiv = 135 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FDiv = 136 typed [One IdRef "Operand1", One IdRef "Operand2"],
    UMod = 137 typed [One IdRef "Operand1", One IdRef "Operand2"],
    SRem = 138 typed [One IdRef "Operand1", One IdRef "Operand2"],
    SMod = 139 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FRem = 140 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FMod = 141 typed [One IdRef "Operand1", One IdRef "Operand2"],
    VectorTimesScalar = 142 typed [One IdRef "Vector", One IdRef "Scalar"],
    MatrixTimesScalar = 143 typed [One IdRef "Matrix", One IdRef "Scalar"],
    VectorTimesMatrix = 144 typed [One IdRef "Vector", One IdRef "Matrix"],
    MatrixTimesVector = 145 typed [One IdRef "Matrix", One IdRef "Vector"],
    MatrixTimesMatrix = 146 typed [One IdRef "LeftMatrix", One IdRef "RightMatrix"],
    OuterProduct = 147 typed [One IdRef "Vector1", One IdRef "Vector2"],
    Dot = 148 typed [One IdRef "Vector1", One IdRef "Vector2"],
    IAddCarry = 149 typed [One IdRef "Operand1", One IdRef "Operand2"],
    ISubBorrow = 150 typed [One IdRef "Operand1", One IdRef "Operand2"],
    UMulExtended = 151 typed [One IdRef "Operand1", One IdRef "Operand2"],
    SMulExtended = 152 typed [One IdRef "Operand1", One IdRef "Operand2"],

    // Relational and logical
    Any = 154 typed [One IdRef "Vector"],
    All = 155 typed [One IdRef "Vector"],
    IsNan = 156 typed [One IdRef "x"],
    IsInf = 157 typed [One IdRef "x"],
    IsFinite = 158 typed [One IdRef "x"],
    IsNormal = 159 typed [One IdRef "x"],
    SignBitSet = 160 typed [One IdRef "x"],
    LessOrGreater = 161 typed [One IdRef "x", One IdRef "y"],
    Ordered = 162 typed [One IdRef "x", One IdRef "y"],
    Unordered = 163 typed [One IdRef "x", One IdRef "y"],
    LogicalEqual = 164 typed [One IdRef "Operand1", One IdRef "Operand2"],
    LogicalNotEqual = 165 typed [One IdRef "Operand1", One IdRef "Operand2"],
    LogicalOr = 166 typed [One IdRef "Operand1", One IdRef "Operand2"],
    LogicalAnd = 167 typed [One IdRef "Operand1", One IdRef "Operand2"],
    LogicalNot = 168 typed [One IdRef "Operand"],
    Select = 169 typed [One IdRef "Condition", One IdRef "Object1", One IdRef "Object2"],
    IEqual = 170 typed [One IdRef "Operand1", One IdRef "Operand2"],
    INotEqual = 171 typed [One IdRef "Operand1", One IdRef "Operand2"],
    UGreaterThan = 172 typed [One IdRef "Operand1", One IdRef "Operand2"],
    SGreaterThan = 173 typed [One IdRef "Operand1", One IdRef "Operand2"],
    UGreaterThanEqual = 174 typed [One IdRef "Operand1", One IdRef "Operand2"],
    SGreaterThanEqual = 175 typed [One IdRef "Operand1", One IdRef "Operand2"],
    ULessThan = 176 typed [One IdRef "Operand1", One IdRef "Operand2"],
    SLessThan = 177 typed [One IdRef "Operand1", One IdRef "Operand2"],
    ULessThanEqual = 178 typed [One IdRef "Operand1", One IdRef "Operand2"],
    SLessThanEqual = 179 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FOrdEqual = 180 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FUnordEqual = 181 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FOrdNotEqual = 182 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FUnordNotEqual = 183 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FOrdLessThan = 184 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FUnordLessThan = 185 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FOrdGreaterThan = 186 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FUnordGreaterThan = 187 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FOrdLessThanEqual = 188 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FUnordLessThanEqual = 189 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FOrdGreaterThanEqual = 190 typed [One IdRef "Operand1", One IdRef "Operand2"],
    FUnordGreaterThanEqual = 191 typed [One IdRef "Operand1", One IdRef "Operand2"],

    // Bit instructions
    ShiftRightLogical = 194 typed [One IdRef "Base", One IdRef "Shift"],
    ShiftRightArithmetic = 195 typed [One IdRef "Base", One IdRef "Shift"],
    ShiftLeftLogical = 196 typed [One IdRef "Base", One IdRef "Shift"],
    BitwiseOr = 197 typed [One IdRef "Operand1", One IdRef "Operand2"],
    BitwiseXor = 198 typed [One IdRef "Operand1", One IdRef "Operand2"],
    BitwiseAnd = 199 typed [One IdRef "Operand1", One IdRef "Operand2"],
    Not = 200 typed [One IdRef "Operand"],
    BitFieldInsert = 201 typed [
        One IdRef "Base",
        One IdRef "Insert",
        One IdRef "Offset",
        One IdRef "Count",
    ],
    BitFieldSExtract = 202 typed [One IdRef "Base", One IdRef "Offset", One IdRef "Count"],
    BitFieldUExtract = 203 typed [One IdRef "Base", One IdRef "Offset", One IdRef "Count"],
    BitReverse = 204 typed [One IdRef "Base"],
    BitCount = 205 typed [One IdRef "Base"],

    // Derivatives
    DPdx = 207 typed [One IdRef "P"],
    DPdy = 208 typed [One IdRef "P"],
    Fwidth = 209 typed [One IdRef "P"],
    DPdxFine = 210 typed [One IdRef "P"],
    DPdyFine = 211 typed [One IdRef "P"],
    FwidthFine = 212 typed [One IdRef "P"],
    DPdxCoarse = 213 typed [One IdRef "P"],
    DPdyCoarse = 214 typed [One IdRef "P"],
    FwidthCoarse = 215 typed [One IdRef "P"],

    // Primitives and barriers
    EmitVertex = 218 [],
    EndPrimitive = 219 [],
    EmitStreamVertex = 220 [One IdRef "Stream"],
    EndStreamPrimitive = 221 [One IdRef "Stream"],
    ControlBarrier = 224 [
        One IdScope "Execution",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
    ],
    MemoryBarrier = 225 [One IdScope "Memory", One IdMemorySemantics "Semantics"],

    // Atomics
    AtomicLoad = 227 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
    ],
    AtomicStore = 228 [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicExchange = 229 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicCompareExchange = 230 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Equal",
        One IdMemorySemantics "Unequal",
        One IdRef "Value",
        One IdRef "Comparator",
    ],
    AtomicCompareExchangeWeak = 231 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Equal",
        One IdMemorySemantics "Unequal",
        One IdRef "Value",
        One IdRef "Comparator",
    ],
    AtomicIIncrement = 232 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
    ],
    AtomicIDecrement = 233 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
    ],
    AtomicIAdd = 234 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicISub = 235 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicSMin = 236 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicUMin = 237 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicSMax = 238 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicUMax = 239 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicAnd = 240 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicOr = 241 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],
    AtomicXor = 242 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
        One IdRef "Value",
    ],

    // Control flow
    Phi = 245 typed [Variadic PairIdRefIdRef "VariableParent"],
    LoopMerge = 246 [
        One IdRef "MergeBlock",
        One IdRef "ContinueTarget",
        One BitEnum "LoopControl",
        Variadic LiteralInteger "LoopControlParameters",
    ],
    SelectionMerge = 247 [One IdRef "MergeBlock", One BitEnum "SelectionControl"],
    Label = 248 result [],
    Branch = 249 [One IdRef "TargetLabel"],
    BranchConditional = 250 [
        One IdRef "Condition",
        One IdRef "TrueLabel",
        One IdRef "FalseLabel",
        Variadic LiteralInteger "BranchWeights",
    ],
    Switch = 251 [
        One IdRef "Selector",
        One IdRef "Default",
        Variadic PairLiteralIntegerIdRef "Target",
    ],
    Kill = 252 [],
    Return = 253 [],
    ReturnValue = 254 [One IdRef "Value"],
    Unreachable = 255 [],
    LifetimeStart = 256 [One IdRef "Pointer", One LiteralInteger "Size"],
    LifetimeStop = 257 [One IdRef "Pointer", One LiteralInteger "Size"],

    // Group operations
    GroupAsyncCopy = 259 typed [
        One IdScope "Execution",
        One IdRef "Destination",
        One IdRef "Source",
        One IdRef "NumElements",
        One IdRef "Stride",
        One IdRef "Event",
    ],
    GroupWaitEvents = 260 [
        One IdScope "Execution",
        One IdRef "NumEvents",
        One IdRef "EventsList",
    ],
    GroupAll = 261 typed [One IdScope "Execution", One IdRef "Predicate"],
    GroupAny = 262 typed [One IdScope "Execution", One IdRef "Predicate"],
    GroupBroadcast = 263 typed [One IdScope "Execution", One IdRef "Value", One IdRef "LocalId"],
    GroupIAdd = 264 typed [One IdScope "Execution", One ValueEnum "Operation", One IdRef "X"],
    GroupFAdd = 265 typed [One IdScope "Execution", One ValueEnum "Operation", One IdRef "X"],
    GroupFMin = 266 typed [One IdScope "Execution", One ValueEnum "Operation", One IdRef "X"],
    GroupUMin = 267 typed [One IdScope "Execution", One ValueEnum "Operation", One IdRef "X"],
    GroupSMin = 268 typed [One IdScope "Execution", One ValueEnum "Operation", One IdRef "X"],
    GroupFMax = 269 typed [One IdScope "Execution", One ValueEnum "Operation", One IdRef "X"],
    GroupUMax = 270 typed [One IdScope "Execution", One ValueEnum "Operation", One IdRef "X"],
    GroupSMax = 271 typed [One IdScope "Execution", One ValueEnum "Operation", One IdRef "X"],

    // Pipes
    ReadPipe = 274 typed [
        One IdRef "Pipe",
        One IdRef "Pointer",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    WritePipe = 275 typed [
        One IdRef "Pipe",
        One IdRef "Pointer",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    ReservedReadPipe = 276 typed [
        One IdRef "Pipe",
        One IdRef "ReserveId",
        One IdRef "Index",
        One IdRef "Pointer",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    ReservedWritePipe = 277 typed [
        One IdRef "Pipe",
        One IdRef "ReserveId",
        One IdRef "Index",
        One IdRef "Pointer",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    ReserveReadPipePackets = 278 typed [
        One IdRef "Pipe",
        One IdRef "NumPackets",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    ReserveWritePipePackets = 279 typed [
        One IdRef "Pipe",
        One IdRef "NumPackets",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    CommitReadPipe = 280 [
        One IdRef "Pipe",
        One IdRef "ReserveId",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    CommitWritePipe = 281 [
        One IdRef "Pipe",
        One IdRef "ReserveId",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    IsValidReserveId = 282 typed [One IdRef "ReserveId"],
    GetNumPipePackets = 283 typed [
        One IdRef "Pipe",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    GetMaxPipePackets = 284 typed [
        One IdRef "Pipe",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    GroupReserveReadPipePackets = 285 typed [
        One IdScope "Execution",
        One IdRef "Pipe",
        One IdRef "NumPackets",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    GroupReserveWritePipePackets = 286 typed [
        One IdScope "Execution",
        One IdRef "Pipe",
        One IdRef "NumPackets",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    GroupCommitReadPipe = 287 [
        One IdScope "Execution",
        One IdRef "Pipe",
        One IdRef "ReserveId",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],
    GroupCommitWritePipe = 288 [
        One IdScope "Execution",
        One IdRef "Pipe",
        One IdRef "ReserveId",
        One IdRef "PacketSize",
        One IdRef "PacketAlignment",
    ],

    // Device-side enqueue
    EnqueueMarker = 291 typed [
        One IdRef "Queue",
        One IdRef "NumEvents",
        One IdRef "WaitEvents",
        One IdRef "RetEvent",
    ],
    EnqueueKernel = 292 typed [
        One IdRef "Queue",
        One IdRef "Flags",
        One IdRef "NDRange",
        One IdRef "NumEvents",
        One IdRef "WaitEvents",
        One IdRef "RetEvent",
        One IdRef "Invoke",
        One IdRef "Param",
        One IdRef "ParamSize",
        One IdRef "ParamAlign",
        Variadic IdRef "LocalSize",
    ],
    GetKernelNDrangeSubGroupCount = 293 typed [
        One IdRef "NDRange",
        One IdRef "Invoke",
        One IdRef "Param",
        One IdRef "ParamSize",
        One IdRef "ParamAlign",
    ],
    GetKernelNDrangeMaxSubGroupSize = 294 typed [
        One IdRef "NDRange",
        One IdRef "Invoke",
        One IdRef "Param",
        One IdRef "ParamSize",
        One IdRef "ParamAlign",
    ],
    GetKernelWorkGroupSize = 295 typed [
        One IdRef "Invoke",
        One IdRef "Param",
        One IdRef "ParamSize",
        One IdRef "ParamAlign",
    ],
    GetKernelPreferredWorkGroupSizeMultiple = 296 typed [
        One IdRef "Invoke",
        One IdRef "Param",
        One IdRef "ParamSize",
        One IdRef "ParamAlign",
    ],
    RetainEvent = 297 [One IdRef "Event"],
    ReleaseEvent = 298 [One IdRef "Event"],
    CreateUserEvent = 299 typed [],
    IsValidEvent = 300 typed [One IdRef "Event"],
    SetUserEventStatus = 301 [One IdRef "Event", One IdRef "Status"],
    CaptureEventProfilingInfo = 302 [
        One IdRef "Event",
        One IdRef "ProfilingInfo",
        One IdRef "Value",
    ],
    GetDefaultQueue = 303 typed [],
    BuildNDRange = 304 typed [
        One IdRef "GlobalWorkSize",
        One IdRef "LocalWorkSize",
        One IdRef "GlobalWorkOffset",
    ],

    // Sparse images
    ImageSparseSampleImplicitLod = 305 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseSampleExplicitLod = 306 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseSampleDrefImplicitLod = 307 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseSampleDrefExplicitLod = 308 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        One BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseSampleProjImplicitLod = 309 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseSampleProjExplicitLod = 310 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseSampleProjDrefImplicitLod = 311 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseSampleProjDrefExplicitLod = 312 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        One BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseFetch = 313 typed [
        One IdRef "Image",
        One IdRef "Coordinate",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseGather = 314 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Component",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseDrefGather = 315 typed [
        One IdRef "SampledImage",
        One IdRef "Coordinate",
        One IdRef "Dref",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    ImageSparseTexelsResident = 316 typed [One IdRef "ResidentCode"],
    NoLine = 317 [],
    AtomicFlagTestAndSet = 318 typed [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
    ],
    AtomicFlagClear = 319 [
        One IdRef "Pointer",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
    ],
    ImageSparseRead = 320 typed [
        One IdRef "Image",
        One IdRef "Coordinate",
        Optional BitEnum "ImageOperands",
        Variadic IdRef "ImageOperandIds",
    ],
    SizeOf = 321 typed [One IdRef "Pointer"],
    TypePipeStorage = 322 result [],
    ConstantPipeStorage = 323 typed [
        One LiteralInteger "PacketSize",
        One LiteralInteger "PacketAlignment",
        One LiteralInteger "Capacity",
    ],
    CreatePipeFromPipeStorage = 324 typed [One IdRef "PipeStorage"],
    GetKernelLocalSizeForSubgroupCount = 325 typed [
        One IdRef "SubgroupCount",
        One IdRef "Invoke",
        One IdRef "Param",
        One IdRef "ParamSize",
        One IdRef "ParamAlign",
    ],
    GetKernelMaxNumSubgroups = 326 typed [
        One IdRef "Invoke",
        One IdRef "Param",
        One IdRef "ParamSize",
        One IdRef "ParamAlign",
    ],
    TypeNamedBarrier = 327 result [],
    NamedBarrierInitialize = 328 typed [One IdRef "SubgroupCount"],
    MemoryNamedBarrier = 329 [
        One IdRef "NamedBarrier",
        One IdScope "Memory",
        One IdMemorySemantics "Semantics",
    ],
    ModuleProcessed = 330 [One LiteralString "Process"],
    ExecutionModeId = 331 [
        One IdRef "EntryPoint",
        One ValueEnum "Mode",
        Variadic IdRef "Operands",
    ],
    DecorateId = 332 [
        One IdRef "Target",
        One ValueEnum "Decoration",
        Variadic IdRef "DecorationParameters",
    ],

    // Non-uniform subgroup operations
    GroupNonUniformElect = 333 typed [One IdScope "Execution"],
    GroupNonUniformAll = 334 typed [One IdScope "Execution", One IdRef "Predicate"],
    GroupNonUniformAny = 335 typed [One IdScope "Execution", One IdRef "Predicate"],
    GroupNonUniformAllEqual = 336 typed [One IdScope "Execution", One IdRef "Value"],
    GroupNonUniformBroadcast = 337 typed [
        One IdScope "Execution",
        One IdRef "Value",
        One IdRef "Id",
    ],
    GroupNonUniformBroadcastFirst = 338 typed [One IdScope "Execution", One IdRef "Value"],
    GroupNonUniformBallot = 339 typed [One IdScope "Execution", One IdRef "Predicate"],
    GroupNonUniformInverseBallot = 340 typed [One IdScope "Execution", One IdRef "Value"],
    GroupNonUniformBallotBitExtract = 341 typed [
        One IdScope "Execution",
        One IdRef "Value",
        One IdRef "Index",
    ],
    GroupNonUniformBallotBitCount = 342 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
    ],
    GroupNonUniformBallotFindLSB = 343 typed [One IdScope "Execution", One IdRef "Value"],
    GroupNonUniformBallotFindMSB = 344 typed [One IdScope "Execution", One IdRef "Value"],
    GroupNonUniformShuffle = 345 typed [
        One IdScope "Execution",
        One IdRef "Value",
        One IdRef "Id",
    ],
    GroupNonUniformShuffleXor = 346 typed [
        One IdScope "Execution",
        One IdRef "Value",
        One IdRef "Mask",
    ],
    GroupNonUniformShuffleUp = 347 typed [
        One IdScope "Execution",
        One IdRef "Value",
        One IdRef "Delta",
    ],
    GroupNonUniformShuffleDown = 348 typed [
        One IdScope "Execution",
        One IdRef "Value",
        One IdRef "Delta",
    ],
    GroupNonUniformIAdd = 349 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformFAdd = 350 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformIMul = 351 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformFMul = 352 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformSMin = 353 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformUMin = 354 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformFMin = 355 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformSMax = 356 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformUMax = 357 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformFMax = 358 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformBitwiseAnd = 359 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformBitwiseOr = 360 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformBitwiseXor = 361 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformLogicalAnd = 362 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformLogicalOr = 363 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformLogicalXor = 364 typed [
        One IdScope "Execution",
        One ValueEnum "Operation",
        One IdRef "Value",
        Optional IdRef "ClusterSize",
    ],
    GroupNonUniformQuadBroadcast = 365 typed [
        One IdScope "Execution",
        One IdRef "Value",
        One IdRef "Index",
    ],
    GroupNonUniformQuadSwap = 366 typed [
        One IdScope "Execution",
        One IdRef "Value",
        One IdRef "Direction",
    ],

    // SPIR-V 1.4 and later
    CopyLogical = 400 typed [One IdRef "Operand"],
    PtrEqual = 401 typed [One IdRef "Operand1", One IdRef "Operand2"],
    PtrNotEqual = 402 typed [One IdRef "Operand1", One IdRef "Operand2"],
    PtrDiff = 403 typed [One IdRef "Operand1", One IdRef "Operand2"],
    TerminateInvocation = 4416 [],
    SDot = 4450 typed [
        One IdRef "Vector1",
        One IdRef "Vector2",
        Optional ValueEnum "PackedVectorFormat",
    ],
    UDot = 4451 typed [
        One IdRef "Vector1",
        One IdRef "Vector2",
        Optional ValueEnum "PackedVectorFormat",
    ],
    SUDot = 4452 typed [
        One IdRef "Vector1",
        One IdRef "Vector2",
        Optional ValueEnum "PackedVectorFormat",
    ],
    SDotAccSat = 4453 typed [
        One IdRef "Vector1",
        One IdRef "Vector2",
        One IdRef "Accumulator",
        Optional ValueEnum "PackedVectorFormat",
    ],
    UDotAccSat = 4454 typed [
        One IdRef "Vector1",
        One IdRef "Vector2",
        One IdRef "Accumulator",
        Optional ValueEnum "PackedVectorFormat",
    ],
    SUDotAccSat = 4455 typed [
        One IdRef "Vector1",
        One IdRef "Vector2",
        One IdRef "Accumulator",
        Optional ValueEnum "PackedVectorFormat",
    ],
    DemoteToHelperInvocation = 5380 [],
    DecorateString = 5632 [
        One IdRef "Target",
        One ValueEnum "Decoration",
        Variadic LiteralString "Values",
    ],
    MemberDecorateString = 5633 [
        One IdRef "StructType",
        One LiteralInteger "Member",
        One ValueEnum "Decoration",
        Variadic LiteralString "Values",
    ],
}

/// `StorageClass::Input`.
pub const STORAGE_CLASS_INPUT: u32 = 1;

/// `StorageClass::Output`.
pub const STORAGE_CLASS_OUTPUT: u32 = 3;

/// `StorageClass::Function`: the storage class of function-local variables.
pub const STORAGE_CLASS_FUNCTION: u32 = 7;

impl Op {
    /// Returns the raw opcode.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Returns `(has_result_type, has_result)` for this opcode.
    pub fn result_layout(self) -> (bool, bool) {
        match self.operands() {
            [first, second, ..]
                if first.kind == OperandKind::IdResultType && second.kind == OperandKind::IdResult =>
            {
                (true, true)
            }
            [first, ..] if first.kind == OperandKind::IdResult => (false, true),
            _ => (false, false),
        }
    }

    /// Looks up a schema slot by name.
    pub fn operand_spec(self, name: &str) -> Option<&'static OperandSpec> {
        self.operands().iter().find(|spec| spec.name == name)
    }

    /// Returns the operands an `OpSpecConstantOp` embedding this opcode
    /// carries after its `Opcode` literal: the schema without result slots.
    pub fn spec_constant_operands(self) -> &'static [OperandSpec] {
        let operands = self.operands();
        match self.result_layout() {
            (true, true) => &operands[2..],
            (false, true) => &operands[1..],
            _ => operands,
        }
    }
}

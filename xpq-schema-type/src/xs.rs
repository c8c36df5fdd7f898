const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// The atomic types of the XML Schema lattice known to the engine.
///
/// Types form a DAG rooted at `anyAtomicType`. The nineteen primitive types
/// answer themselves from [`Xs::primitive`]; the derived integer chain hangs
/// off `decimal` through `integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Xs {
    AnyAtomicType,
    UntypedAtomic,
    String,
    Boolean,
    Decimal,
    Integer,
    NonPositiveInteger,
    NegativeInteger,
    NonNegativeInteger,
    PositiveInteger,
    Long,
    Int,
    Short,
    Byte,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    Float,
    Double,
    Duration,
    DateTime,
    Date,
    Time,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
    HexBinary,
    Base64Binary,
    AnyURI,
    QName,
}

impl Xs {
    pub fn by_name(namespace: Option<&str>, local_name: &str) -> Option<Self> {
        if namespace.is_none() || namespace == Some(XS_NAMESPACE) {
            Xs::by_local_name(local_name)
        } else {
            None
        }
    }

    pub fn by_local_name(local_name: &str) -> Option<Self> {
        use Xs::*;
        let xs = match local_name {
            "anyAtomicType" => AnyAtomicType,
            "untypedAtomic" => UntypedAtomic,
            "string" => String,
            "boolean" => Boolean,
            "decimal" => Decimal,
            "integer" => Integer,
            "nonPositiveInteger" => NonPositiveInteger,
            "negativeInteger" => NegativeInteger,
            "nonNegativeInteger" => NonNegativeInteger,
            "positiveInteger" => PositiveInteger,
            "long" => Long,
            "int" => Int,
            "short" => Short,
            "byte" => Byte,
            "unsignedLong" => UnsignedLong,
            "unsignedInt" => UnsignedInt,
            "unsignedShort" => UnsignedShort,
            "unsignedByte" => UnsignedByte,
            "float" => Float,
            "double" => Double,
            "duration" => Duration,
            "dateTime" => DateTime,
            "date" => Date,
            "time" => Time,
            "gYearMonth" => GYearMonth,
            "gYear" => GYear,
            "gMonthDay" => GMonthDay,
            "gDay" => GDay,
            "gMonth" => GMonth,
            "hexBinary" => HexBinary,
            "base64Binary" => Base64Binary,
            "anyURI" => AnyURI,
            "QName" => QName,
            _ => return None,
        };
        Some(xs)
    }

    pub fn namespace() -> &'static str {
        XS_NAMESPACE
    }

    pub fn local_name(&self) -> &'static str {
        use Xs::*;
        match self {
            AnyAtomicType => "anyAtomicType",
            UntypedAtomic => "untypedAtomic",
            String => "string",
            Boolean => "boolean",
            Decimal => "decimal",
            Integer => "integer",
            NonPositiveInteger => "nonPositiveInteger",
            NegativeInteger => "negativeInteger",
            NonNegativeInteger => "nonNegativeInteger",
            PositiveInteger => "positiveInteger",
            Long => "long",
            Int => "int",
            Short => "short",
            Byte => "byte",
            UnsignedLong => "unsignedLong",
            UnsignedInt => "unsignedInt",
            UnsignedShort => "unsignedShort",
            UnsignedByte => "unsignedByte",
            Float => "float",
            Double => "double",
            Duration => "duration",
            DateTime => "dateTime",
            Date => "date",
            Time => "time",
            GYearMonth => "gYearMonth",
            GYear => "gYear",
            GMonthDay => "gMonthDay",
            GDay => "gDay",
            GMonth => "gMonth",
            HexBinary => "hexBinary",
            Base64Binary => "base64Binary",
            AnyURI => "anyURI",
            QName => "QName",
        }
    }

    /// Clark notation for the type name: `{namespaceURI}localName`.
    pub fn clark(&self) -> std::string::String {
        format!("{{{}}}{}", XS_NAMESPACE, self.local_name())
    }

    /// The direct base type, `None` for the root.
    pub fn parent(&self) -> Option<Xs> {
        use Xs::*;
        match self {
            AnyAtomicType => None,
            UntypedAtomic => Some(AnyAtomicType),
            String => Some(AnyAtomicType),
            Boolean => Some(AnyAtomicType),
            Float => Some(AnyAtomicType),
            Double => Some(AnyAtomicType),
            Decimal => Some(AnyAtomicType),
            Integer => Some(Decimal),
            NonPositiveInteger => Some(Integer),
            NegativeInteger => Some(NonPositiveInteger),
            Long => Some(Integer),
            Int => Some(Long),
            Short => Some(Int),
            Byte => Some(Short),
            NonNegativeInteger => Some(Integer),
            PositiveInteger => Some(NonNegativeInteger),
            UnsignedLong => Some(NonNegativeInteger),
            UnsignedInt => Some(UnsignedLong),
            UnsignedShort => Some(UnsignedInt),
            UnsignedByte => Some(UnsignedShort),
            Duration => Some(AnyAtomicType),
            DateTime => Some(AnyAtomicType),
            Date => Some(AnyAtomicType),
            Time => Some(AnyAtomicType),
            GYearMonth => Some(AnyAtomicType),
            GYear => Some(AnyAtomicType),
            GMonthDay => Some(AnyAtomicType),
            GDay => Some(AnyAtomicType),
            GMonth => Some(AnyAtomicType),
            HexBinary => Some(AnyAtomicType),
            Base64Binary => Some(AnyAtomicType),
            AnyURI => Some(AnyAtomicType),
            QName => Some(AnyAtomicType),
        }
    }

    /// The primitive root of this type. Primitives answer themselves;
    /// the derived integer chain answers `decimal`.
    pub fn primitive(&self) -> Xs {
        let mut current = *self;
        loop {
            if current.is_primitive() {
                return current;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    pub fn is_primitive(&self) -> bool {
        use Xs::*;
        matches!(
            self,
            String
                | Boolean
                | Decimal
                | Float
                | Double
                | Duration
                | DateTime
                | Date
                | Time
                | GYearMonth
                | GYear
                | GMonthDay
                | GDay
                | GMonth
                | HexBinary
                | Base64Binary
                | AnyURI
                | QName
                | UntypedAtomic
        )
    }

    pub fn derives_from(&self, other: Xs) -> bool {
        if self == &other {
            return true;
        }
        match self.parent() {
            Some(parent_type) => parent_type.derives_from(other),
            None => false,
        }
    }

    /// Whether this type takes part in numeric promotion
    /// (`integer < decimal < float < double`).
    pub fn is_numeric(&self) -> bool {
        self.derives_from(Xs::Decimal)
            || self.derives_from(Xs::Float)
            || self.derives_from(Xs::Double)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derives_from() {
        assert!(Xs::Integer.derives_from(Xs::Integer));
        assert!(Xs::Integer.derives_from(Xs::Decimal));
        assert!(Xs::Integer.derives_from(Xs::AnyAtomicType));
        assert!(Xs::Byte.derives_from(Xs::AnyAtomicType));
        assert!(!Xs::Decimal.derives_from(Xs::Integer));
    }

    #[test]
    fn test_primitive_roots() {
        assert_eq!(Xs::UnsignedByte.primitive(), Xs::Decimal);
        assert_eq!(Xs::Integer.primitive(), Xs::Decimal);
        assert_eq!(Xs::Date.primitive(), Xs::Date);
        assert_eq!(Xs::String.primitive(), Xs::String);
    }

    #[test]
    fn test_numeric() {
        assert!(Xs::Integer.is_numeric());
        assert!(Xs::UnsignedShort.is_numeric());
        assert!(Xs::Double.is_numeric());
        assert!(!Xs::String.is_numeric());
        assert!(!Xs::Boolean.is_numeric());
    }

    #[test]
    fn test_by_name() {
        assert_eq!(
            Xs::by_name(Some(Xs::namespace()), "unsignedLong"),
            Some(Xs::UnsignedLong)
        );
        assert_eq!(Xs::by_name(Some("urn:other"), "string"), None);
        assert_eq!(Xs::by_local_name("gMonthDay"), Some(Xs::GMonthDay));
    }

    #[test]
    fn test_clark() {
        assert_eq!(
            Xs::String.clark(),
            "{http://www.w3.org/2001/XMLSchema}string"
        );
    }
}

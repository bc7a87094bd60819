//! BQ25723 register map.
//!
//! Registers are 16 bits wide and sent low byte first. The driver does not
//! interpret their contents; these names only serve lookup and debugging.

/// Factory default 7-bit bus address.
pub const DEFAULT_ADDRESS: u8 = 0x6B;
/// Alternate 7-bit bus address used by some variants of the family.
pub const ALTERNATE_ADDRESS: u8 = 0x6A;

const UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Register {
    ChargeOption0 = 0x00,
    ChargeCurrent = 0x02,
    ChargeVoltage = 0x04,
    OtgVoltage = 0x06,
    OtgCurrent = 0x08,
    InputVoltage = 0x0A,
    VsysMin = 0x0C,
    IinHost = 0x0E,
    ChargerStatus = 0x20,
    ProchotStatus = 0x22,
    IinDpm = 0x24,
    AdcVbusPsys = 0x26,
    AdcIbat = 0x28,
    AdcIinCmpin = 0x2A,
    AdcVsysVbat = 0x2C,
    ManufacturerId = 0x2E,
    DeviceId = 0x2F,
    ChargeOption1 = 0x30,
    ChargeOption2 = 0x32,
    ChargeOption3 = 0x34,
    ProchotOption0 = 0x36,
    ProchotOption1 = 0x38,
    AdcOption = 0x3A,
    ChargeOption4 = 0x3C,
    VminActProt = 0x3E,
}

impl Register {
    /// Every named register, in address order.
    pub const ALL: [Register; 25] = [
        Register::ChargeOption0,
        Register::ChargeCurrent,
        Register::ChargeVoltage,
        Register::OtgVoltage,
        Register::OtgCurrent,
        Register::InputVoltage,
        Register::VsysMin,
        Register::IinHost,
        Register::ChargerStatus,
        Register::ProchotStatus,
        Register::IinDpm,
        Register::AdcVbusPsys,
        Register::AdcIbat,
        Register::AdcIinCmpin,
        Register::AdcVsysVbat,
        Register::ManufacturerId,
        Register::DeviceId,
        Register::ChargeOption1,
        Register::ChargeOption2,
        Register::ChargeOption3,
        Register::ProchotOption0,
        Register::ProchotOption1,
        Register::AdcOption,
        Register::ChargeOption4,
        Register::VminActProt,
    ];

    pub fn addr(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::ChargeOption0 => "CHARGE_OPTION_0",
            Register::ChargeCurrent => "CHARGE_CURRENT",
            Register::ChargeVoltage => "CHARGE_VOLTAGE",
            Register::OtgVoltage => "OTG_VOLTAGE",
            Register::OtgCurrent => "OTG_CURRENT",
            Register::InputVoltage => "INPUT_VOLTAGE",
            Register::VsysMin => "VSYS_MIN",
            Register::IinHost => "IIN_HOST",
            Register::ChargerStatus => "CHARGER_STATUS",
            Register::ProchotStatus => "PROCHOT_STATUS",
            Register::IinDpm => "IIN_DPM",
            Register::AdcVbusPsys => "ADCVBUS_PSYS",
            Register::AdcIbat => "ADCIBAT",
            Register::AdcIinCmpin => "ADCIINCMPIN",
            Register::AdcVsysVbat => "ADCVSYSVBAT",
            Register::ManufacturerId => "MANUFACTURER_ID",
            Register::DeviceId => "DEVICE_ID",
            Register::ChargeOption1 => "CHARGE_OPTION_1",
            Register::ChargeOption2 => "CHARGE_OPTION_2",
            Register::ChargeOption3 => "CHARGE_OPTION_3",
            Register::ProchotOption0 => "PROCHOT_OPTION_0",
            Register::ProchotOption1 => "PROCHOT_OPTION_1",
            Register::AdcOption => "ADC_OPTION",
            Register::ChargeOption4 => "CHARGE_OPTION_4",
            Register::VminActProt => "VMIN_ACT_PROT",
        }
    }

    pub fn from_addr(addr: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|reg| reg.addr() == addr)
    }
}

impl From<Register> for u8 {
    fn from(reg: Register) -> u8 {
        reg.addr()
    }
}

impl std::str::FromStr for Register {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|reg| reg.name().eq_ignore_ascii_case(wanted))
            .ok_or(())
    }
}

/// Human readable name for a register address, `"UNKNOWN"` when unnamed.
pub fn register_name(addr: u8) -> &'static str {
    Register::from_addr(addr).map(Register::name).unwrap_or(UNKNOWN)
}
